//! Declarative [`Reflect`](crate::reflect::Reflect) implementations.

/// Implement `Reflect` for a plain struct.
///
/// Every listed field becomes a readable and writable member and a parameter
/// of one constructor taking all fields in order. A field written as
/// `name: Type = default` gets a constructor default, used when a record
/// being read has no such field.
///
/// ```
/// use jetwire::reflect_record;
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct Person {
///     name: String,
///     age: i32,
///     score: f64,
/// }
///
/// reflect_record!(Person as "com.example.Person" {
///     name: String,
///     age: i32,
///     score: f64 = 3.14,
/// });
/// ```
#[macro_export]
macro_rules! reflect_record {
    (@param $field:ident $fty:ty) => {
        $crate::reflect::Parameter::required::<$fty>(stringify!($field))
    };
    (@param $field:ident $fty:ty = $default:expr) => {
        $crate::reflect::Parameter::optional::<$fty>(stringify!($field), $default)
    };
    ($ty:ident $(as $fullname:literal)? { $($field:ident : $fty:ty $(= $default:expr)?),* $(,)? }) => {
        impl $crate::reflect::Reflect for $ty {
            fn type_info() -> $crate::reflect::TypeInfo {
                #[allow(unused_mut)]
                let mut builder = $crate::reflect::RecordInfo::builder::<$ty>();
                $( builder = builder.name($fullname); )?
                builder
                    $(
                        .field::<$fty>(
                            stringify!($field),
                            |record: &$ty| &record.$field,
                            |record: &mut $ty, value: $fty| record.$field = value,
                        )
                    )*
                    .constructor(
                        vec![$($crate::reflect_record!(@param $field $fty $(= $default)?)),*],
                        |args: &mut $crate::reflect::Arguments| {
                            Ok($ty { $($field: args.next::<$fty>()?),* })
                        },
                    )
                    .build()
            }
        }
    };
}

/// Implement `Reflect` for a fieldless enum.
///
/// Symbols take the variant names and integral values take the variant
/// discriminants. The enum must be `PartialEq + Clone`.
///
/// ```
/// use jetwire::reflect_enum;
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// enum Suit {
///     Clubs,
///     Diamonds,
///     Hearts = 10,
///     Spades,
/// }
///
/// reflect_enum!(Suit { Clubs, Diamonds, Hearts, Spades });
/// ```
#[macro_export]
macro_rules! reflect_enum {
    ($ty:ident $(as $fullname:literal)? { $($variant:ident),* $(,)? }) => {
        impl $crate::reflect::Reflect for $ty {
            fn type_info() -> $crate::reflect::TypeInfo {
                #[allow(unused_mut)]
                let mut builder = $crate::reflect::EnumInfo::builder::<$ty>();
                $( builder = builder.name($fullname); )?
                builder
                    $(.symbol(stringify!($variant), $ty::$variant as i64, $ty::$variant))*
                    .build()
            }
        }
    };
}
