//! Build-time mutual-exclusion checks for credential builders.

// self
use crate::error::ConfigError;

/// A named, mutually-exclusive configuration group with per-field presence flags.
#[derive(Clone, Debug)]
pub(crate) struct ConfigGroup {
	pub label: &'static str,
	pub fields: Vec<ConfigField>,
}
impl ConfigGroup {
	pub fn new(label: &'static str, fields: impl Into<Vec<ConfigField>>) -> Self {
		Self { label, fields: fields.into() }
	}

	fn is_full(&self) -> bool {
		self.fields.iter().all(|field| field.present)
	}

	fn is_untouched(&self) -> bool {
		self.fields.iter().all(|field| !field.present)
	}

	fn present_fields(&self) -> impl Iterator<Item = &'static str> + '_ {
		self.fields.iter().filter(|field| field.present).map(|field| field.name)
	}

	fn missing_fields(&self) -> impl Iterator<Item = &'static str> + '_ {
		self.fields.iter().filter(|field| !field.present).map(|field| field.name)
	}
}

/// Presence flag for a single builder field.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ConfigField {
	pub name: &'static str,
	pub present: bool,
}
impl ConfigField {
	pub fn new(name: &'static str, present: bool) -> Self {
		Self { name, present }
	}
}

/// Requires that exactly one group is fully populated and every other group is
/// untouched; returns the index of the satisfied group.
///
/// A fully populated group combined with stray fields from another group counts
/// as a conflict. Never recovered; callers surface the error from `build()`.
pub(crate) fn require_exactly_one(
	credential: &'static str,
	groups: &[ConfigGroup],
) -> Result<usize, ConfigError> {
	let touched = groups.iter().filter(|group| !group.is_untouched()).count();
	let full = groups.iter().position(|group| group.is_full());

	match (full, touched) {
		(Some(index), 1) => Ok(index),
		(None, 1) => match groups.iter().find(|group| !group.is_untouched()) {
			Some(group) => Err(ConfigError::IncompleteCredentialSource {
				credential,
				group: group.label,
				missing: group.missing_fields().collect::<Vec<_>>().join(", "),
			}),
			None => Err(missing_error(credential, groups)),
		},
		(None, 0) => Err(missing_error(credential, groups)),
		_ => Err(ConfigError::ConflictingCredentialSources {
			credential,
			fields: groups
				.iter()
				.flat_map(ConfigGroup::present_fields)
				.collect::<Vec<_>>()
				.join(", "),
		}),
	}
}

fn missing_error(credential: &'static str, groups: &[ConfigGroup]) -> ConfigError {
	ConfigError::MissingCredentialSource {
		credential,
		groups: groups.iter().map(|group| group.label.to_owned()).collect::<Vec<_>>().join(", "),
	}
}
