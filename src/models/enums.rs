use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(SymptomCategory {
    Mental => "mental",
    General => "general",
    Particular => "particular",
    Modality => "modality",
});

str_enum!(Polarity {
    Better => "better",
    Worse => "worse",
});

str_enum!(OutcomeStatus {
    Pending => "pending",
    Improved => "improved",
    NoChange => "no_change",
    Worsened => "worsened",
    NotFollowed => "not_followed",
});

str_enum!(Potency {
    C6 => "6C",
    C30 => "30C",
    C200 => "200C",
    M1 => "1M",
});

str_enum!(RemedyKingdom {
    Plant => "plant",
    Mineral => "mineral",
    Animal => "animal",
    Nosode => "nosode",
    Imponderable => "imponderable",
});
