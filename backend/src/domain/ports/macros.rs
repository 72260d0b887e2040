//! Generates repository error enums with snake_case constructors.
//!
//! Every variant carries named fields; each constructor accepts
//! `impl Into<FieldType>` so call sites can pass `&str` for `String` fields.

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident { $($field:ident : $ty:ty),* $(,)? } => $message:literal
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant { $($field: $ty),* },
            )*
        }

        impl $name {
            $(
                ::paste::paste! {
                    #[doc = concat!("Build [`", stringify!($name), "::", stringify!($variant), "`].")]
                    pub fn [<$variant:snake>]($($field: impl Into<$ty>),*) -> Self {
                        Self::$variant { $($field: $field.into()),* }
                    }
                }
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    define_port_error! {
        pub enum LedgerError {
            Unreachable { message: String } => "ledger unreachable: {message}",
            Short { missing: u32 } => "ledger short by {missing}",
            Split { message: String, missing: u32 } => "{message}: {missing}",
        }
    }

    #[test]
    fn string_fields_accept_str() {
        assert_eq!(
            LedgerError::unreachable("timeout").to_string(),
            "ledger unreachable: timeout"
        );
    }

    #[test]
    fn numeric_fields_keep_their_type() {
        assert_eq!(
            LedgerError::short(3_u32),
            LedgerError::Short { missing: 3 }
        );
    }

    #[test]
    fn mixed_fields_render_in_order() {
        assert_eq!(LedgerError::split("gap", 2_u32).to_string(), "gap: 2");
    }
}
