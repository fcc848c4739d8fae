//! Content entities
//!
//! A content entity is owned, publishable, translatable and revisionable.
//! Entity-level accessors such as [`ContentEntity::owner_id`] read the default
//! translation; each translation keeps its own owner, publish flag and
//! timestamps.

use crate::account::{ANONYMOUS_ID, ActorId};
use crate::error::{EntityError, EntityResult};
use crate::identity::{EntityTypeDescriptor, PermissionKey};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Entity identifier, assigned on first save
pub type EntityId = u64;

/// Revision identifier, unique across all revisions stored in one table
pub type RevisionId = u64;

/// Language code for content whose language is not specified
pub const LANGCODE_NOT_SPECIFIED: &str = "und";

/// One language variant of an entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Translation {
	name: String,
	fields: Map<String, JsonValue>,
	owner_id: Option<ActorId>,
	published: bool,
	created: DateTime<Utc>,
	changed: DateTime<Utc>,
	#[serde(default)]
	revision_translation_affected: bool,
}

impl Translation {
	/// Create a published translation with the given name
	pub fn new(name: impl Into<String>) -> Self {
		let now = Utc::now();
		Self {
			name: name.into(),
			fields: Map::new(),
			owner_id: None,
			published: true,
			created: now,
			changed: now,
			revision_translation_affected: false,
		}
	}

	/// Name (label) of this translation
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Set the name
	pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
		self.name = name.into();
		self.touch()
	}

	/// Custom field value
	pub fn field(&self, name: &str) -> Option<&JsonValue> {
		self.fields.get(name)
	}

	/// All custom field values
	pub fn fields(&self) -> &Map<String, JsonValue> {
		&self.fields
	}

	/// Set a custom field value
	pub fn set_field(&mut self, name: impl Into<String>, value: JsonValue) -> &mut Self {
		self.fields.insert(name.into(), value);
		self.touch()
	}

	/// Owner of this translation, if set
	pub fn owner_id(&self) -> Option<ActorId> {
		self.owner_id
	}

	/// Set the owner
	pub fn set_owner_id(&mut self, owner_id: ActorId) -> &mut Self {
		self.owner_id = Some(owner_id);
		self.touch()
	}

	/// Whether this translation is published
	pub fn is_published(&self) -> bool {
		self.published
	}

	/// Set the publish flag
	pub fn set_published(&mut self, published: bool) -> &mut Self {
		self.published = published;
		self.touch()
	}

	/// Creation time
	pub fn created_time(&self) -> DateTime<Utc> {
		self.created
	}

	/// Set the creation time
	pub fn set_created_time(&mut self, created: DateTime<Utc>) -> &mut Self {
		self.created = created;
		self
	}

	/// Last change time
	pub fn changed_time(&self) -> DateTime<Utc> {
		self.changed
	}

	/// Whether this translation changed in the revision it was loaded from
	pub fn is_revision_translation_affected(&self) -> bool {
		self.revision_translation_affected
	}

	/// Compare everything but timestamps and the affected flag
	pub fn same_content(&self, other: &Translation) -> bool {
		self.name == other.name
			&& self.fields == other.fields
			&& self.owner_id == other.owner_id
			&& self.published == other.published
	}

	pub(crate) fn set_revision_translation_affected(&mut self, affected: bool) {
		self.revision_translation_affected = affected;
	}

	fn touch(&mut self) -> &mut Self {
		self.changed = Utc::now();
		self
	}
}

/// A revisionable content entity
///
/// # Examples
///
/// ```
/// use entity_tools_core::entity::ContentEntity;
///
/// let mut entity = ContentEntity::new("contact", "en", "Jane Doe");
/// entity.set_owner_id(5).set_published(false);
///
/// assert!(entity.is_new());
/// assert_eq!(entity.label(), "Jane Doe");
/// assert_eq!(entity.owner_id(), Some(5));
/// assert!(!entity.is_published());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawContentEntity")]
pub struct ContentEntity {
	entity_type: String,
	bundle: Option<String>,
	id: Option<EntityId>,
	revision_id: Option<RevisionId>,
	default_langcode: String,
	revision_langcode: String,
	translations: IndexMap<String, Translation>,
	revision_author_id: Option<ActorId>,
	revision_created: DateTime<Utc>,
	revision_log_message: Option<String>,
	default_revision: bool,
	new_revision: bool,
	// Raised by the typed setters, cleared once a save consumed them
	#[serde(skip)]
	revision_created_set: bool,
	#[serde(skip)]
	revision_log_set: bool,
}

/// Serialized shape of [`ContentEntity`], checked before it becomes one
#[derive(Deserialize)]
struct RawContentEntity {
	entity_type: String,
	bundle: Option<String>,
	id: Option<EntityId>,
	revision_id: Option<RevisionId>,
	default_langcode: String,
	revision_langcode: String,
	translations: IndexMap<String, Translation>,
	revision_author_id: Option<ActorId>,
	revision_created: DateTime<Utc>,
	revision_log_message: Option<String>,
	default_revision: bool,
	new_revision: bool,
}

impl TryFrom<RawContentEntity> for ContentEntity {
	type Error = EntityError;

	fn try_from(raw: RawContentEntity) -> EntityResult<Self> {
		check_default_translation(&raw.default_langcode, &raw.translations)?;
		Ok(Self {
			entity_type: raw.entity_type,
			bundle: raw.bundle,
			id: raw.id,
			revision_id: raw.revision_id,
			default_langcode: raw.default_langcode,
			revision_langcode: raw.revision_langcode,
			translations: raw.translations,
			revision_author_id: raw.revision_author_id,
			revision_created: raw.revision_created,
			revision_log_message: raw.revision_log_message,
			default_revision: raw.default_revision,
			new_revision: raw.new_revision,
			revision_created_set: false,
			revision_log_set: false,
		})
	}
}

fn check_default_translation(
	default_langcode: &str,
	translations: &IndexMap<String, Translation>,
) -> EntityResult<()> {
	if translations.contains_key(default_langcode) {
		Ok(())
	} else {
		Err(EntityError::InvalidState(format!(
			"entity has no translation in its default language '{}'",
			default_langcode
		)))
	}
}

impl ContentEntity {
	/// Create a new, unsaved entity with a single published translation
	pub fn new(
		entity_type: impl Into<String>,
		langcode: impl Into<String>,
		name: impl Into<String>,
	) -> Self {
		let langcode = langcode.into();
		let mut translations = IndexMap::new();
		translations.insert(langcode.clone(), Translation::new(name));

		Self {
			entity_type: entity_type.into(),
			bundle: None,
			id: None,
			revision_id: None,
			revision_langcode: langcode.clone(),
			default_langcode: langcode,
			translations,
			revision_author_id: None,
			revision_created: Utc::now(),
			revision_log_message: None,
			default_revision: true,
			new_revision: true,
			revision_created_set: false,
			revision_log_set: false,
		}
	}

	/// Set the bundle
	pub fn with_bundle(mut self, bundle: impl Into<String>) -> Self {
		self.bundle = Some(bundle.into());
		self
	}

	/// Set the owner of the default translation
	pub fn with_owner(mut self, owner_id: ActorId) -> Self {
		self.set_owner_id(owner_id);
		self
	}

	/// Set a field on the default translation
	pub fn with_field(mut self, name: impl Into<String>, value: JsonValue) -> Self {
		self.set_field(name, value);
		self
	}

	/// Machine name of the entity type
	pub fn entity_type(&self) -> &str {
		&self.entity_type
	}

	/// Bundle, if the entity type is bundled
	pub fn bundle(&self) -> Option<&str> {
		self.bundle.as_deref()
	}

	/// Entity id, `None` until first saved
	pub fn id(&self) -> Option<EntityId> {
		self.id
	}

	/// Revision id, `None` until first saved
	pub fn revision_id(&self) -> Option<RevisionId> {
		self.revision_id
	}

	/// Whether the entity has never been saved
	pub fn is_new(&self) -> bool {
		self.id.is_none()
	}

	/// Default language code
	pub fn langcode(&self) -> &str {
		&self.default_langcode
	}

	/// Language code recorded on the revision row
	///
	/// Diverges from [`langcode`](Self::langcode) once a language has been
	/// cleared from stored revisions.
	pub fn revision_langcode(&self) -> &str {
		&self.revision_langcode
	}

	/// Permission key of this entity under the given descriptor
	pub fn permission_key(&self, descriptor: &EntityTypeDescriptor) -> EntityResult<PermissionKey> {
		if descriptor.type_id() != self.entity_type {
			return Err(EntityError::InvalidArgument(format!(
				"entity of type '{}' checked against descriptor '{}'",
				self.entity_type,
				descriptor.type_id()
			)));
		}
		descriptor.permission_key(self.bundle.as_deref())
	}

	/// Default translation
	pub fn default_translation(&self) -> &Translation {
		// Present from construction on; removal and deserialization both refuse to lose it
		&self.translations[self.default_langcode.as_str()]
	}

	/// Mutable default translation
	pub fn default_translation_mut(&mut self) -> &mut Translation {
		&mut self.translations[self.default_langcode.as_str()]
	}

	/// Label of the default translation
	pub fn label(&self) -> &str {
		self.default_translation().name()
	}

	/// Set the name of the default translation
	pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
		self.default_translation_mut().set_name(name);
		self
	}

	/// Field of the default translation
	pub fn field(&self, name: &str) -> Option<&JsonValue> {
		self.default_translation().field(name)
	}

	/// Set a field on the default translation
	pub fn set_field(&mut self, name: impl Into<String>, value: JsonValue) -> &mut Self {
		self.default_translation_mut().set_field(name, value);
		self
	}

	/// Owner of the default translation
	pub fn owner_id(&self) -> Option<ActorId> {
		self.default_translation().owner_id()
	}

	/// Set the owner of the default translation
	pub fn set_owner_id(&mut self, owner_id: ActorId) -> &mut Self {
		self.default_translation_mut().set_owner_id(owner_id);
		self
	}

	/// Whether the default translation is published
	pub fn is_published(&self) -> bool {
		self.default_translation().is_published()
	}

	/// Set the publish flag of the default translation
	pub fn set_published(&mut self, published: bool) -> &mut Self {
		self.default_translation_mut().set_published(published);
		self
	}

	/// Creation time of the default translation
	pub fn created_time(&self) -> DateTime<Utc> {
		self.default_translation().created_time()
	}

	/// Last change time of the default translation
	pub fn changed_time(&self) -> DateTime<Utc> {
		self.default_translation().changed_time()
	}

	/// Whether a translation exists for the language
	pub fn has_translation(&self, langcode: &str) -> bool {
		self.translations.contains_key(langcode)
	}

	/// Translation for a language
	pub fn translation(&self, langcode: &str) -> Option<&Translation> {
		self.translations.get(langcode)
	}

	/// Mutable translation for a language
	pub fn translation_mut(&mut self, langcode: &str) -> Option<&mut Translation> {
		self.translations.get_mut(langcode)
	}

	/// All translations, default first
	pub fn translations(&self) -> impl Iterator<Item = (&str, &Translation)> {
		self.translations.iter().map(|(k, v)| (k.as_str(), v))
	}

	/// Language codes of all translations, default first
	pub fn translation_languages(&self) -> Vec<&str> {
		self.translations.keys().map(String::as_str).collect()
	}

	/// Add a translation
	///
	/// Fails if the language already has one or the code is empty.
	pub fn add_translation(
		&mut self,
		langcode: impl Into<String>,
		name: impl Into<String>,
	) -> EntityResult<&mut Translation> {
		let langcode = langcode.into();
		if langcode.is_empty() {
			return Err(EntityError::InvalidArgument(
				"language code must not be empty".to_string(),
			));
		}
		if self.translations.contains_key(&langcode) {
			return Err(EntityError::InvalidArgument(format!(
				"translation '{}' already exists",
				langcode
			)));
		}

		let mut translation = Translation::new(name);
		translation.owner_id = self.owner_id();
		Ok(self.translations.entry(langcode).or_insert(translation))
	}

	/// Remove a non-default translation
	pub fn remove_translation(&mut self, langcode: &str) -> EntityResult<Translation> {
		if langcode == self.default_langcode {
			return Err(EntityError::InvalidArgument(format!(
				"cannot remove the default translation '{}'",
				langcode
			)));
		}
		self.translations
			.shift_remove(langcode)
			.ok_or_else(|| EntityError::NotFound(format!("translation '{}'", langcode)))
	}

	/// Drop every translation except the default one
	pub fn retain_default_translation(&mut self) {
		let default = self.default_langcode.clone();
		self.translations.retain(|langcode, _| *langcode == default);
	}

	/// Author of this revision, if set
	pub fn revision_author_id(&self) -> Option<ActorId> {
		self.revision_author_id
	}

	/// Set the author of this revision
	pub fn set_revision_author_id(&mut self, author_id: ActorId) -> &mut Self {
		self.revision_author_id = Some(author_id);
		self
	}

	/// Creation time of this revision
	pub fn revision_created_time(&self) -> DateTime<Utc> {
		self.revision_created
	}

	/// Set the creation time of this revision
	///
	/// Without this call, a save that creates a new revision stamps the
	/// current time.
	pub fn set_revision_created_time(&mut self, created: DateTime<Utc>) -> &mut Self {
		self.revision_created = created;
		self.revision_created_set = true;
		self
	}

	/// Log message attached to this revision
	pub fn revision_log_message(&self) -> Option<&str> {
		self.revision_log_message.as_deref()
	}

	/// Set the log message attached to this revision
	///
	/// The message belongs to the next saved revision only; later revisions
	/// start without one.
	pub fn set_revision_log_message(&mut self, message: impl Into<String>) -> &mut Self {
		self.revision_log_message = Some(message.into());
		self.revision_log_set = true;
		self
	}

	/// Whether this is the default (canonical) revision
	pub fn is_default_revision(&self) -> bool {
		self.default_revision
	}

	/// Mark this revision as default (or not) when saved
	pub fn set_default_revision(&mut self, default: bool) -> &mut Self {
		self.default_revision = default;
		self
	}

	/// Whether the next save creates a new revision
	pub fn is_new_revision(&self) -> bool {
		self.new_revision
	}

	/// Make the next save create a new revision (or update the current one)
	pub fn set_new_revision(&mut self, new_revision: bool) -> &mut Self {
		self.new_revision = new_revision;
		self
	}

	/// Fill in defaults before the entity is written
	///
	/// Translations without an owner become owned by the anonymous actor, and
	/// a missing revision author becomes the owner of the default translation.
	pub fn pre_save(&mut self) {
		for translation in self.translations.values_mut() {
			if translation.owner_id.is_none() {
				translation.owner_id = Some(ANONYMOUS_ID);
			}
		}

		if self.revision_author_id.is_none() {
			self.revision_author_id = Some(self.owner_id().unwrap_or(ANONYMOUS_ID));
		}

		self.revision_langcode = self.default_langcode.clone();
	}

	/// Flag translations that differ from the current default revision
	///
	/// New translations are always affected. When nothing differs, the
	/// default translation is flagged so every revision affects at least one
	/// language.
	pub fn mark_affected_translations(&mut self, original: Option<&ContentEntity>) {
		let mut any_affected = false;
		for (langcode, translation) in self.translations.iter_mut() {
			let affected = match original.and_then(|o| o.translation(langcode)) {
				Some(previous) => !translation.same_content(previous),
				None => true,
			};
			translation.set_revision_translation_affected(affected);
			any_affected |= affected;
		}

		if !any_affected {
			self.default_translation_mut()
				.set_revision_translation_affected(true);
		}
	}

	/// Reset revision metadata the caller didn't set for the revision being written
	///
	/// A new revision gets the current time and drops a log message carried
	/// over from an earlier revision. Either way the setter flags are consumed.
	pub(crate) fn refresh_revision_metadata(&mut self, new_revision: bool) {
		if new_revision {
			if !self.revision_created_set {
				self.revision_created = Utc::now();
			}
			if !self.revision_log_set {
				self.revision_log_message = None;
			}
		}
		self.revision_created_set = false;
		self.revision_log_set = false;
	}

	pub(crate) fn assign_ids(&mut self, id: EntityId, revision_id: RevisionId) {
		self.id = Some(id);
		self.revision_id = Some(revision_id);
	}

	pub(crate) fn set_revision_langcode(&mut self, langcode: impl Into<String>) {
		self.revision_langcode = langcode.into();
	}

	#[cfg_attr(not(feature = "sqlite"), allow(dead_code))]
	pub(crate) fn from_parts(parts: EntityParts) -> EntityResult<Self> {
		check_default_translation(&parts.default_langcode, &parts.translations)?;
		Ok(Self {
			entity_type: parts.entity_type,
			bundle: parts.bundle,
			id: Some(parts.id),
			revision_id: Some(parts.revision_id),
			default_langcode: parts.default_langcode,
			revision_langcode: parts.revision_langcode,
			translations: parts.translations,
			revision_author_id: parts.revision_author_id,
			revision_created: parts.revision_created,
			revision_log_message: parts.revision_log_message,
			default_revision: parts.default_revision,
			new_revision: true,
			revision_created_set: false,
			revision_log_set: false,
		})
	}
}

/// Column values a store reads back for one revision
#[cfg_attr(not(feature = "sqlite"), allow(dead_code))]
pub(crate) struct EntityParts {
	pub entity_type: String,
	pub bundle: Option<String>,
	pub id: EntityId,
	pub revision_id: RevisionId,
	pub default_langcode: String,
	pub revision_langcode: String,
	pub translations: IndexMap<String, Translation>,
	pub revision_author_id: Option<ActorId>,
	pub revision_created: DateTime<Utc>,
	pub revision_log_message: Option<String>,
	pub default_revision: bool,
}

/// Column values of one stored translation row
#[cfg_attr(not(feature = "sqlite"), allow(dead_code))]
pub(crate) struct TranslationParts {
	pub name: String,
	pub fields: Map<String, JsonValue>,
	pub owner_id: Option<ActorId>,
	pub published: bool,
	pub created: DateTime<Utc>,
	pub changed: DateTime<Utc>,
	pub revision_translation_affected: bool,
}

impl From<TranslationParts> for Translation {
	fn from(parts: TranslationParts) -> Self {
		Self {
			name: parts.name,
			fields: parts.fields,
			owner_id: parts.owner_id,
			published: parts.published,
			created: parts.created,
			changed: parts.changed,
			revision_translation_affected: parts.revision_translation_affected,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn test_new_entity_defaults() {
		let entity = ContentEntity::new("contact", "en", "Jane");

		assert!(entity.is_new());
		assert!(entity.is_published());
		assert!(entity.is_default_revision());
		assert!(entity.is_new_revision());
		assert_eq!(entity.owner_id(), None);
		assert_eq!(entity.translation_languages(), vec!["en"]);
	}

	#[rstest]
	fn test_pre_save_defaults_owner_and_revision_author() {
		let mut entity = ContentEntity::new("contact", "en", "Jane");
		entity.add_translation("fr", "Jeanne").unwrap();

		entity.pre_save();

		assert_eq!(entity.owner_id(), Some(ANONYMOUS_ID));
		assert_eq!(entity.translation("fr").unwrap().owner_id(), Some(ANONYMOUS_ID));
		assert_eq!(entity.revision_author_id(), Some(ANONYMOUS_ID));
	}

	#[rstest]
	fn test_pre_save_revision_author_follows_owner() {
		let mut entity = ContentEntity::new("contact", "en", "Jane").with_owner(12);
		entity.pre_save();
		assert_eq!(entity.revision_author_id(), Some(12));

		let mut explicit = ContentEntity::new("contact", "en", "Jane").with_owner(12);
		explicit.set_revision_author_id(4);
		explicit.pre_save();
		assert_eq!(explicit.revision_author_id(), Some(4));
	}

	#[rstest]
	fn test_translations_are_independent() {
		let mut entity = ContentEntity::new("contact", "en", "Jane").with_owner(2);
		let fr = entity.add_translation("fr", "Jeanne").unwrap();
		fr.set_owner_id(9).set_published(false);

		assert_eq!(entity.owner_id(), Some(2));
		assert!(entity.is_published());
		assert_eq!(entity.translation("fr").unwrap().owner_id(), Some(9));
		assert!(!entity.translation("fr").unwrap().is_published());
	}

	#[rstest]
	fn test_duplicate_and_default_translation_errors() {
		let mut entity = ContentEntity::new("contact", "en", "Jane");
		entity.add_translation("fr", "Jeanne").unwrap();

		assert!(entity.add_translation("fr", "Autre").is_err());
		assert!(entity.add_translation("", "Nothing").is_err());
		assert!(entity.remove_translation("en").is_err());
		assert!(matches!(
			entity.remove_translation("de"),
			Err(EntityError::NotFound(_))
		));
		assert_eq!(entity.remove_translation("fr").unwrap().name(), "Jeanne");
	}

	#[rstest]
	fn test_mark_affected_translations() {
		let mut original = ContentEntity::new("contact", "en", "Jane");
		original.add_translation("fr", "Jeanne").unwrap();

		let mut next = original.clone();
		next.translation_mut("fr")
			.unwrap()
			.set_field("phone", json!("555"));
		next.add_translation("de", "Johanna").unwrap();
		next.mark_affected_translations(Some(&original));

		assert!(!next.default_translation().is_revision_translation_affected());
		assert!(next.translation("fr").unwrap().is_revision_translation_affected());
		assert!(next.translation("de").unwrap().is_revision_translation_affected());
	}

	#[rstest]
	fn test_unchanged_revision_affects_default_translation() {
		let original = ContentEntity::new("contact", "en", "Jane");
		let mut next = original.clone();

		next.mark_affected_translations(Some(&original));

		assert!(next.default_translation().is_revision_translation_affected());
	}

	#[rstest]
	fn test_permission_key_checks_entity_type() {
		let contact = EntityTypeDescriptor::new("contact", "Contact").unwrap();
		let other = EntityTypeDescriptor::new("other", "Other").unwrap();
		let entity = ContentEntity::new("contact", "en", "Jane");

		assert_eq!(entity.permission_key(&contact).unwrap().as_str(), "contact");
		assert!(entity.permission_key(&other).is_err());
	}

	#[rstest]
	fn test_deserialize_keeps_consistent_entity() {
		let mut entity = ContentEntity::new("contact", "en", "Jane");
		entity.add_translation("fr", "Jeanne").unwrap();

		let payload = serde_json::to_string(&entity).unwrap();
		let restored: ContentEntity = serde_json::from_str(&payload).unwrap();

		assert_eq!(restored, entity);
		assert_eq!(restored.label(), "Jane");
	}

	#[rstest]
	#[case::unknown_language("de")]
	#[case::empty("")]
	fn test_deserialize_rejects_missing_default_translation(#[case] langcode: &str) {
		let mut entity = ContentEntity::new("contact", "en", "Jane");
		entity.add_translation("fr", "Jeanne").unwrap();
		let mut payload = serde_json::to_value(&entity).unwrap();
		payload["default_langcode"] = json!(langcode);

		let result = serde_json::from_value::<ContentEntity>(payload);

		let error = result.unwrap_err().to_string();
		assert!(error.contains("no translation in its default language"));
	}

	#[rstest]
	fn test_refresh_revision_metadata() {
		let earlier = Utc::now() - chrono::Duration::hours(1);
		let mut entity = ContentEntity::new("contact", "en", "Jane");
		entity
			.set_revision_created_time(earlier)
			.set_revision_log_message("Imported");

		// setter values survive the save they were made for
		entity.refresh_revision_metadata(true);
		assert_eq!(entity.revision_created_time(), earlier);
		assert_eq!(entity.revision_log_message(), Some("Imported"));

		// the next new revision starts fresh
		entity.refresh_revision_metadata(true);
		assert!(entity.revision_created_time() > earlier);
		assert_eq!(entity.revision_log_message(), None);
	}

	#[rstest]
	fn test_refresh_revision_metadata_in_place_keeps_values() {
		let earlier = Utc::now() - chrono::Duration::hours(1);
		let mut entity = ContentEntity::new("contact", "en", "Jane");
		entity
			.set_revision_created_time(earlier)
			.set_revision_log_message("Imported");
		entity.refresh_revision_metadata(true);

		entity.refresh_revision_metadata(false);

		assert_eq!(entity.revision_created_time(), earlier);
		assert_eq!(entity.revision_log_message(), Some("Imported"));
	}
}
