/// Declares a `String` newtype that can only be built from non-blank input.
#[macro_export]
macro_rules! non_empty_string {
    ($TypeName: ident) => {
        #[derive(
            Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Serialize, serde::Deserialize,
        )]
        #[serde(try_from = "String", into = "String")]
        pub struct $TypeName(String);

        impl $TypeName {
            pub fn inner(&self) -> String {
                self.0.clone()
            }
        }

        impl PartialEq<str> for $TypeName {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl std::fmt::Display for $TypeName {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }

        impl AsRef<str> for $TypeName {
            fn as_ref(&self) -> &str {
                self.0.as_ref()
            }
        }

        impl From<$TypeName> for String {
            fn from(value: $TypeName) -> Self {
                value.0
            }
        }

        impl TryFrom<String> for $TypeName {
            type Error = String;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                if value.trim().is_empty() {
                    return Err("value cannot be empty".to_string());
                }
                Ok($TypeName(value))
            }
        }

        impl TryFrom<&str> for $TypeName {
            type Error = String;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                $TypeName::try_from(value.to_owned())
            }
        }
    };
}

#[cfg(test)]
mod tests {
    crate::non_empty_string!(Recipient);

    #[test]
    fn test_blank_values_are_rejected() {
        assert!(Recipient::try_from("   ").is_err());
        assert!(Recipient::try_from("").is_err());
    }

    #[test]
    fn test_value_is_kept_as_given() {
        let recipient = Recipient::try_from("A@x.com").unwrap();
        assert_eq!(recipient.to_string(), "A@x.com");
        assert!(recipient == *"A@x.com");
    }

    #[test]
    fn test_deserializing_blank_value_fails() {
        let result = serde_json::from_str::<Recipient>("\"\"");
        assert!(result.is_err());
    }
}
