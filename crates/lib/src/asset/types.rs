//! Closed metadata enumerations for asset records.
//!
//! Each enum serializes as its variant name, the same spelling task items use.
//! Parsing from a string is strict: anything but an exact variant name is an
//! [`UnknownValue`]. The only lenient parser is [`CopyOption::parse_lenient`].

use thiserror::Error;

/// A metadata string that names no variant of the field's enum.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {field} '{value}'")]
pub struct UnknownValue {
  pub field: &'static str,
  pub value: String,
}

macro_rules! metadata_enum {
  (
    $(#[$meta:meta])*
    $name:ident => $field:literal { $($(#[$vmeta:meta])* $variant:ident),+ $(,)? }
  ) => {
    $(#[$meta])*
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, ::serde::Serialize, ::serde::Deserialize)]
    pub enum $name {
      $($(#[$vmeta])* $variant),+
    }

    impl $name {
      /// Metadata name of the field this enum types.
      pub const FIELD: &'static str = $field;

      pub fn as_str(self) -> &'static str {
        match self {
          $(Self::$variant => stringify!($variant)),+
        }
      }
    }

    impl ::std::fmt::Display for $name {
      fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
        f.write_str(self.as_str())
      }
    }

    impl ::std::str::FromStr for $name {
      type Err = $crate::asset::UnknownValue;

      fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
          $(stringify!($variant) => Ok(Self::$variant),)+
          _ => Err($crate::asset::UnknownValue {
            field: $field,
            value: value.to_string(),
          }),
        }
      }
    }
  };
}

pub(crate) use metadata_enum;

metadata_enum! {
  /// Where an asset came from.
  SourceType => "SourceType" {
    /// Found on disk by the current project.
    Discovered,
    /// Produced by a build step of the current project.
    Computed,
    /// Pulled from a referenced project's manifest.
    Project,
    /// Pulled from a package's manifest.
    Package,
  }
}

metadata_enum! {
  /// Which lifecycle an asset applies to.
  AssetKind => "AssetKind" {
    Build,
    Publish,
    All,
  }
}

metadata_enum! {
  /// Who sees an asset.
  AssetMode => "AssetMode" {
    /// Only the project that defines it.
    CurrentProject,
    /// Only projects that reference the defining project.
    Reference,
    All,
  }
}

metadata_enum! {
  /// Copy policy towards the output or publish directory.
  CopyOption => "CopyOption" {
    Never,
    PreserveNewest,
    Always,
  }
}

impl AssetKind {
  /// Kind implied by a copy-policy pair when none is set explicitly.
  pub fn from_copy_options(output: CopyOption, publish: CopyOption) -> Self {
    match (output, publish) {
      (CopyOption::Never, CopyOption::Never) => Self::All,
      (CopyOption::Never, _) => Self::Publish,
      (_, CopyOption::Never) => Self::Build,
      _ => Self::All,
    }
  }

  /// Build is the opposite of Publish and vice versa. `All` has no opposite.
  pub fn is_opposite_of(self, other: AssetKind) -> bool {
    matches!(
      (self, other),
      (Self::Build, Self::Publish) | (Self::Publish, Self::Build)
    )
  }
}

impl CopyOption {
  /// Parse a copy policy, mapping empty or unrecognized values to `Never`.
  ///
  /// Discovery accepts whatever copy metadata the build engine hands it, so an
  /// unknown policy disables copying instead of failing the step.
  pub fn parse_lenient(value: &str) -> Self {
    value.parse().unwrap_or(Self::Never)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  mod parsing {
    use super::*;

    #[test]
    fn exact_names_parse() {
      assert_eq!("Computed".parse::<SourceType>().unwrap(), SourceType::Computed);
      assert_eq!("Publish".parse::<AssetKind>().unwrap(), AssetKind::Publish);
      assert_eq!("CurrentProject".parse::<AssetMode>().unwrap(), AssetMode::CurrentProject);
      assert_eq!("PreserveNewest".parse::<CopyOption>().unwrap(), CopyOption::PreserveNewest);
    }

    #[test]
    fn unknown_value_names_field() {
      let err = "Downloaded".parse::<SourceType>().unwrap_err();
      assert_eq!(err.field, "SourceType");
      assert_eq!(err.value, "Downloaded");
      assert_eq!(err.to_string(), "unknown SourceType 'Downloaded'");
    }

    #[test]
    fn parsing_is_case_sensitive() {
      assert!("build".parse::<AssetKind>().is_err());
    }

    #[test]
    fn lenient_copy_option_falls_back_to_never() {
      assert_eq!(CopyOption::parse_lenient("Always"), CopyOption::Always);
      assert_eq!(CopyOption::parse_lenient(""), CopyOption::Never);
      assert_eq!(CopyOption::parse_lenient("IfDifferent"), CopyOption::Never);
    }

    #[test]
    fn serde_uses_variant_names() {
      assert_eq!(serde_json::to_string(&AssetMode::Reference).unwrap(), "\"Reference\"");
      let kind: AssetKind = serde_json::from_str("\"Build\"").unwrap();
      assert_eq!(kind, AssetKind::Build);
    }
  }

  mod kind {
    use super::*;

    #[test]
    fn publish_only_when_output_is_never() {
      assert_eq!(
        AssetKind::from_copy_options(CopyOption::Never, CopyOption::PreserveNewest),
        AssetKind::Publish
      );
    }

    #[test]
    fn build_only_when_publish_is_never() {
      assert_eq!(
        AssetKind::from_copy_options(CopyOption::Always, CopyOption::Never),
        AssetKind::Build
      );
    }

    #[test]
    fn all_when_both_copy() {
      assert_eq!(
        AssetKind::from_copy_options(CopyOption::Always, CopyOption::PreserveNewest),
        AssetKind::All
      );
    }

    #[test]
    fn all_when_neither_copies() {
      assert_eq!(
        AssetKind::from_copy_options(CopyOption::Never, CopyOption::Never),
        AssetKind::All
      );
    }

    #[test]
    fn opposites() {
      assert!(AssetKind::Build.is_opposite_of(AssetKind::Publish));
      assert!(AssetKind::Publish.is_opposite_of(AssetKind::Build));
      assert!(!AssetKind::All.is_opposite_of(AssetKind::Build));
      assert!(!AssetKind::Build.is_opposite_of(AssetKind::All));
      assert!(!AssetKind::Build.is_opposite_of(AssetKind::Build));
    }
  }
}
