//! Case-insensitive deserialization for configuration enums.
//!
//! Operators write `"HTTPS"`, `"https"` or `"Https"` interchangeably in config
//! files; these macros accept all of them.

/// Case-insensitive `Deserialize` for `{"type": ..., "value": ...}` enums whose
/// variants each wrap a value constructible from a `String`.
#[macro_export]
macro_rules! impl_case_insensitive_enum {
    ($enum_name:ident, { $($variant_str:expr => $variant:ident),* $(,)? }) => {
        impl<'de> ::serde::Deserialize<'de> for $enum_name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                use ::serde::de::{self, MapAccess, Visitor};
                use std::fmt;

                struct EnumVisitor;

                impl<'de> Visitor<'de> for EnumVisitor {
                    type Value = $enum_name;

                    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                        formatter.write_str(concat!("a map with `type` and `value` for ", stringify!($enum_name)))
                    }

                    fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
                    where
                        M: MapAccess<'de>,
                    {
                        let mut type_: Option<String> = None;
                        let mut value: Option<String> = None;

                        while let Some(key) = map.next_key::<String>()? {
                            match key.as_str() {
                                "type" => type_ = Some(map.next_value()?),
                                "value" => value = Some(map.next_value()?),
                                other => return Err(de::Error::unknown_field(other, &["type", "value"])),
                            }
                        }

                        let type_ = type_.ok_or_else(|| de::Error::missing_field("type"))?;
                        let value = value.ok_or_else(|| de::Error::missing_field("value"))?;

                        match type_.to_lowercase().as_str() {
                            $(
                                $variant_str => Ok($enum_name::$variant(value.into())),
                            )*
                            _ => Err(de::Error::unknown_variant(&type_, &[$($variant_str),*])),
                        }
                    }
                }

                deserializer.deserialize_map(EnumVisitor)
            }
        }
    };
}

/// Case-insensitive `Deserialize` for field-less enums written as plain strings.
#[macro_export]
macro_rules! impl_case_insensitive_unit_enum {
    ($enum_name:ident, { $($variant_str:expr => $variant:ident),* $(,)? }) => {
        impl<'de> ::serde::Deserialize<'de> for $enum_name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                let raw = <String as ::serde::Deserialize>::deserialize(deserializer)?;
                match raw.to_lowercase().as_str() {
                    $(
                        $variant_str => Ok($enum_name::$variant),
                    )*
                    _ => Err(<D::Error as ::serde::de::Error>::unknown_variant(
                        &raw,
                        &[$($variant_str),*],
                    )),
                }
            }
        }
    };
}
