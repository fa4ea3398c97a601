//! Defines helper macros for generating domain port error enums.
//!
//! Every variant gets a snake_case constructor taking `impl Into<_>` for each
//! field, so adapters write `PostRepositoryError::not_found(id)` instead of
//! spelling out struct literals.

macro_rules! define_port_error {
    (@ctor $name:ident $variant:ident) => {
        ::paste::paste! {
            #[doc = "Construct the variant of the same name."]
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $name:ident $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $name $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $name:ident $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            #[doc = "Construct the variant of the same name."]
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $name:ident $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $name
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $name $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use crate::domain::PostId;

    define_port_error! {
        pub enum ExampleStoreError {
            Missing { key: String } => "missing: {key}",
            Exhausted => "store exhausted",
            Mixed { key: String, attempts: u32 } => "mixed: {key} after {attempts}",
            Typed { id: PostId } => "typed: {id}",
        }
    }

    #[test]
    fn constructors_accept_str_for_string_fields() {
        let err = ExampleStoreError::missing("abc");
        assert_eq!(err.to_string(), "missing: abc");
    }

    #[test]
    fn unit_variants_get_nullary_constructors() {
        assert_eq!(ExampleStoreError::exhausted(), ExampleStoreError::Exhausted);
        assert_eq!(ExampleStoreError::exhausted().to_string(), "store exhausted");
    }

    #[test]
    fn constructors_support_mixed_fields() {
        let err = ExampleStoreError::mixed("abc", 3_u32);
        assert_eq!(err.to_string(), "mixed: abc after 3");
    }

    #[test]
    fn constructors_accept_domain_types() {
        let id = PostId::new("p1").expect("post id");
        let err = ExampleStoreError::typed(id);
        assert_eq!(err.to_string(), "typed: p1");
    }
}
