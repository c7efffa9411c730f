//! Raw type facts supplied by [`Reflect`] implementations.
//!
//! A [`TypeInfo`] says what shape a type has and carries type-erased
//! accessors (`&dyn Any` in, `&dyn Any` or `Box<dyn Any>` out) that compiled
//! routines call at run time. Nested types are referenced through
//! [`TypeRef`], whose description is produced lazily, so a type may contain
//! itself (through `Box`, `Vec`, `Option` and so on) without describing
//! itself forever.

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::sync::Arc;

use crate::error::TypeMismatch;

/// A type that can describe its own shape.
pub trait Reflect: Any {
    /// Describe this type.
    fn type_info() -> TypeInfo;
}

/// Identity and lazy description of a reflected type.
#[derive(Clone, Copy)]
pub struct TypeRef {
    id: TypeId,
    name: &'static str,
    info: fn() -> TypeInfo,
}

impl TypeRef {
    /// Reference to `T`.
    pub fn of<T: Reflect>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            info: T::type_info,
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Full Rust type name, for messages.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Produce the type's description.
    pub fn info(&self) -> TypeInfo {
        (self.info)()
    }

    /// Whether this refers to `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeRef {}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

// ============================================================================
// Type-erased accessors
// ============================================================================

pub type Getter = Arc<dyn for<'a> Fn(&'a dyn Any) -> Result<&'a dyn Any, TypeMismatch> + Send + Sync>;
pub type OptionalGetter =
    Arc<dyn for<'a> Fn(&'a dyn Any) -> Result<Option<&'a dyn Any>, TypeMismatch> + Send + Sync>;
pub type ItemsGetter =
    Arc<dyn for<'a> Fn(&'a dyn Any) -> Result<Vec<&'a dyn Any>, TypeMismatch> + Send + Sync>;
pub type EntriesGetter = Arc<
    dyn for<'a> Fn(&'a dyn Any) -> Result<Vec<(&'a str, &'a dyn Any)>, TypeMismatch> + Send + Sync,
>;
pub type IndexGetter = Arc<dyn Fn(&dyn Any) -> Result<usize, TypeMismatch> + Send + Sync>;
pub type Wrapper = Arc<dyn Fn(Box<dyn Any>) -> Result<Box<dyn Any>, TypeMismatch> + Send + Sync>;
pub type Setter = Arc<dyn Fn(&mut dyn Any, Box<dyn Any>) -> Result<(), TypeMismatch> + Send + Sync>;
pub type Factory = Arc<dyn Fn() -> Box<dyn Any> + Send + Sync>;
pub type Collector =
    Arc<dyn Fn(Vec<Box<dyn Any>>) -> Result<Box<dyn Any>, TypeMismatch> + Send + Sync>;
pub type EntryCollector =
    Arc<dyn Fn(Vec<(String, Box<dyn Any>)>) -> Result<Box<dyn Any>, TypeMismatch> + Send + Sync>;
pub type Invoker = Arc<dyn Fn(Vec<Box<dyn Any>>) -> Result<Box<dyn Any>, TypeMismatch> + Send + Sync>;

/// Borrow a type-erased value as `T`.
pub fn downcast<T: Any>(value: &dyn Any) -> Result<&T, TypeMismatch> {
    value.downcast_ref::<T>().ok_or(TypeMismatch {
        expected: type_name::<T>(),
    })
}

/// Take ownership of a type-erased value as `T`.
pub fn take<T: Any>(value: Box<dyn Any>) -> Result<T, TypeMismatch> {
    value.downcast::<T>().map(|boxed| *boxed).map_err(|_| TypeMismatch {
        expected: type_name::<T>(),
    })
}

// Closures handed to these helpers get their higher-ranked signatures from
// the bounds; `Arc::new` alone would not infer them.

pub(crate) fn getter<F>(f: F) -> Getter
where
    F: for<'a> Fn(&'a dyn Any) -> Result<&'a dyn Any, TypeMismatch> + Send + Sync + 'static,
{
    Arc::new(f)
}

pub(crate) fn optional_getter<F>(f: F) -> OptionalGetter
where
    F: for<'a> Fn(&'a dyn Any) -> Result<Option<&'a dyn Any>, TypeMismatch>
        + Send
        + Sync
        + 'static,
{
    Arc::new(f)
}

pub(crate) fn items_getter<F>(f: F) -> ItemsGetter
where
    F: for<'a> Fn(&'a dyn Any) -> Result<Vec<&'a dyn Any>, TypeMismatch> + Send + Sync + 'static,
{
    Arc::new(f)
}

pub(crate) fn entries_getter<F>(f: F) -> EntriesGetter
where
    F: for<'a> Fn(&'a dyn Any) -> Result<Vec<(&'a str, &'a dyn Any)>, TypeMismatch>
        + Send
        + Sync
        + 'static,
{
    Arc::new(f)
}

// ============================================================================
// TypeInfo
// ============================================================================

/// Shape of a reflected type.
#[derive(Clone)]
pub enum TypeInfo {
    /// A value with no inner structure; the resolver classifies it by type identity.
    Leaf,
    /// `Option<T>`-like: present or absent.
    Option(OptionInfo),
    /// `Box<T>`-like: one owned indirection.
    Boxed(BoxedInfo),
    /// Ordered sequence of items.
    Sequence(SequenceInfo),
    /// String-keyed map.
    Map(MapInfo),
    /// Fieldless enumeration.
    Enum(EnumInfo),
    /// Record with named members and constructors.
    Record(RecordInfo),
    /// Tagged union with one payload type per variant.
    Union(UnionInfo),
}

impl TypeInfo {
    /// Short name of the shape, for messages.
    pub fn kind(&self) -> &'static str {
        match self {
            TypeInfo::Leaf => "leaf",
            TypeInfo::Option(_) => "option",
            TypeInfo::Boxed(_) => "box",
            TypeInfo::Sequence(_) => "sequence",
            TypeInfo::Map(_) => "map",
            TypeInfo::Enum(_) => "enum",
            TypeInfo::Record(_) => "record",
            TypeInfo::Union(_) => "union",
        }
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeInfo::Record(record) => write!(f, "Record({})", record.fullname()),
            TypeInfo::Enum(info) => write!(f, "Enum({})", info.name),
            other => f.write_str(other.kind()),
        }
    }
}

/// Accessors of an optional type.
#[derive(Clone)]
pub struct OptionInfo {
    pub inner: TypeRef,
    get: OptionalGetter,
    some: Wrapper,
    none: Factory,
}

impl OptionInfo {
    /// Describe `Option<T>`.
    pub fn of<T: Reflect>() -> Self {
        Self {
            inner: TypeRef::of::<T>(),
            get: optional_getter(|value| {
                Ok(downcast::<Option<T>>(value)?.as_ref().map(|v| v as &dyn Any))
            }),
            some: Arc::new(|value: Box<dyn Any>| -> Result<Box<dyn Any>, TypeMismatch> {
                Ok(Box::new(Some(take::<T>(value)?)))
            }),
            none: Arc::new(|| Box::new(None::<T>) as Box<dyn Any>),
        }
    }

    /// Borrow the present value, if any.
    pub fn get<'a>(&self, value: &'a dyn Any) -> Result<Option<&'a dyn Any>, TypeMismatch> {
        (self.get)(value)
    }

    /// Wrap an inner value as present.
    pub fn some(&self, inner: Box<dyn Any>) -> Result<Box<dyn Any>, TypeMismatch> {
        (self.some)(inner)
    }

    /// The absent value.
    pub fn none(&self) -> Box<dyn Any> {
        (self.none)()
    }
}

/// Accessors of a boxed type.
#[derive(Clone)]
pub struct BoxedInfo {
    pub inner: TypeRef,
    get: Getter,
    wrap: Wrapper,
}

impl BoxedInfo {
    /// Describe `Box<T>`.
    pub fn of<T: Reflect>() -> Self {
        Self {
            inner: TypeRef::of::<T>(),
            get: getter(|value| Ok(downcast::<Box<T>>(value)?.as_ref() as &dyn Any)),
            wrap: Arc::new(|value: Box<dyn Any>| -> Result<Box<dyn Any>, TypeMismatch> {
                Ok(Box::new(Box::new(take::<T>(value)?)))
            }),
        }
    }

    /// Borrow the boxed value.
    pub fn get<'a>(&self, value: &'a dyn Any) -> Result<&'a dyn Any, TypeMismatch> {
        (self.get)(value)
    }

    /// Box an inner value.
    pub fn wrap(&self, inner: Box<dyn Any>) -> Result<Box<dyn Any>, TypeMismatch> {
        (self.wrap)(inner)
    }
}

/// Accessors of a sequence type.
#[derive(Clone)]
pub struct SequenceInfo {
    pub item: TypeRef,
    items: ItemsGetter,
    collect: Collector,
}

impl SequenceInfo {
    /// Describe a sequence type `C` of items `T`.
    pub fn of<C, T>() -> Self
    where
        C: Reflect + FromIterator<T>,
        for<'c> &'c C: IntoIterator<Item = &'c T>,
        T: Reflect,
    {
        Self {
            item: TypeRef::of::<T>(),
            items: items_getter(|value| {
                Ok(downcast::<C>(value)?
                    .into_iter()
                    .map(|item| item as &dyn Any)
                    .collect())
            }),
            collect: Arc::new(|items: Vec<Box<dyn Any>>| -> Result<Box<dyn Any>, TypeMismatch> {
                let collected = items
                    .into_iter()
                    .map(take::<T>)
                    .collect::<Result<C, TypeMismatch>>()?;
                Ok(Box::new(collected))
            }),
        }
    }

    /// Borrow every item in order.
    pub fn items<'a>(&self, value: &'a dyn Any) -> Result<Vec<&'a dyn Any>, TypeMismatch> {
        (self.items)(value)
    }

    /// Build the sequence from owned items.
    pub fn collect(&self, items: Vec<Box<dyn Any>>) -> Result<Box<dyn Any>, TypeMismatch> {
        (self.collect)(items)
    }
}

/// Accessors of a string-keyed map type.
#[derive(Clone)]
pub struct MapInfo {
    pub value: TypeRef,
    entries: EntriesGetter,
    collect: EntryCollector,
}

impl MapInfo {
    /// Describe a map type `M` from `String` keys to `V`.
    pub fn of<M, V>() -> Self
    where
        M: Reflect + FromIterator<(String, V)>,
        for<'m> &'m M: IntoIterator<Item = (&'m String, &'m V)>,
        V: Reflect,
    {
        Self {
            value: TypeRef::of::<V>(),
            entries: entries_getter(|value| {
                Ok(downcast::<M>(value)?
                    .into_iter()
                    .map(|(k, v)| (k.as_str(), v as &dyn Any))
                    .collect())
            }),
            collect: Arc::new(
                |entries: Vec<(String, Box<dyn Any>)>| -> Result<Box<dyn Any>, TypeMismatch> {
                let collected = entries
                    .into_iter()
                    .map(|(k, v)| take::<V>(v).map(|v| (k, v)))
                    .collect::<Result<M, TypeMismatch>>()?;
                    Ok(Box::new(collected))
                },
            ),
        }
    }

    /// Borrow every entry.
    pub fn entries<'a>(
        &self,
        value: &'a dyn Any,
    ) -> Result<Vec<(&'a str, &'a dyn Any)>, TypeMismatch> {
        (self.entries)(value)
    }

    /// Build the map from owned entries.
    pub fn collect(
        &self,
        entries: Vec<(String, Box<dyn Any>)>,
    ) -> Result<Box<dyn Any>, TypeMismatch> {
        (self.collect)(entries)
    }
}

// ============================================================================
// Enums
// ============================================================================

/// One symbol of a fieldless enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumSymbol {
    pub name: String,
    /// Underlying integral value.
    pub value: i64,
}

/// Symbols and accessors of a fieldless enum.
#[derive(Clone)]
pub struct EnumInfo {
    pub name: String,
    pub namespace: Option<String>,
    pub symbols: Vec<EnumSymbol>,
    index_of: IndexGetter,
    from_index: Arc<dyn Fn(usize) -> Option<Box<dyn Any>> + Send + Sync>,
}

impl EnumInfo {
    /// Start describing enum `T`.
    pub fn builder<T>() -> EnumInfoBuilder<T>
    where
        T: Reflect + PartialEq + Clone + Send + Sync,
    {
        let (namespace, name) = split_type_name(type_name::<T>());
        EnumInfoBuilder {
            name,
            namespace,
            symbols: Vec::new(),
            variants: Vec::new(),
        }
    }

    /// Position of a value's symbol.
    pub fn index_of(&self, value: &dyn Any) -> Result<usize, TypeMismatch> {
        (self.index_of)(value)
    }

    /// Value of the symbol at `index`.
    pub fn from_index(&self, index: usize) -> Option<Box<dyn Any>> {
        (self.from_index)(index)
    }

    pub fn fullname(&self) -> String {
        qualify(&self.name, self.namespace.as_deref())
    }
}

/// Builder for [`EnumInfo`].
pub struct EnumInfoBuilder<T> {
    name: String,
    namespace: Option<String>,
    symbols: Vec<EnumSymbol>,
    variants: Vec<T>,
}

impl<T> EnumInfoBuilder<T>
where
    T: Reflect + PartialEq + Clone + Send + Sync,
{
    /// Override the enum name; a dotted name also sets the namespace.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        let (namespace, name) = split_fullname(name.into());
        self.name = name;
        self.namespace = namespace.or(self.namespace);
        self
    }

    /// Override the namespace.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Add a symbol with its integral value.
    pub fn symbol(mut self, name: impl Into<String>, value: i64, variant: T) -> Self {
        self.symbols.push(EnumSymbol {
            name: name.into(),
            value,
        });
        self.variants.push(variant);
        self
    }

    pub fn build(self) -> TypeInfo {
        let variants = Arc::new(self.variants);
        let lookup = Arc::clone(&variants);
        TypeInfo::Enum(EnumInfo {
            name: self.name,
            namespace: self.namespace,
            symbols: self.symbols,
            index_of: Arc::new(move |value: &dyn Any| -> Result<usize, TypeMismatch> {
                let value = downcast::<T>(value)?;
                lookup
                    .iter()
                    .position(|v| v == value)
                    .ok_or(TypeMismatch {
                        expected: type_name::<T>(),
                    })
            }),
            from_index: Arc::new(move |index: usize| -> Option<Box<dyn Any>> {
                variants
                    .get(index)
                    .map(|v| Box::new(v.clone()) as Box<dyn Any>)
            }),
        })
    }
}

// ============================================================================
// Records
// ============================================================================

/// A readable (and possibly writable) member of a record.
#[derive(Clone)]
pub struct MemberInfo {
    pub name: String,
    pub ty: TypeRef,
    get: Getter,
    set: Option<Setter>,
}

impl MemberInfo {
    /// Borrow the member from a record value.
    pub fn get<'a>(&self, record: &'a dyn Any) -> Result<&'a dyn Any, TypeMismatch> {
        (self.get)(record)
    }

    /// Whether the member can be assigned after construction.
    pub fn is_settable(&self) -> bool {
        self.set.is_some()
    }

    /// Assign the member; read-only members report a mismatch.
    pub fn set(&self, record: &mut dyn Any, value: Box<dyn Any>) -> Result<(), TypeMismatch> {
        match &self.set {
            Some(set) => set(record, value),
            None => Err(TypeMismatch {
                expected: "a settable member",
            }),
        }
    }
}

/// A constructor parameter.
#[derive(Clone)]
pub struct ParameterInfo {
    pub name: String,
    pub ty: TypeRef,
    default: Option<Factory>,
}

impl ParameterInfo {
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// A fresh copy of the default value.
    pub fn default_value(&self) -> Option<Box<dyn Any>> {
        self.default.as_ref().map(|f| f())
    }
}

/// Typed constructor parameter declaration.
pub struct Parameter;

impl Parameter {
    /// A parameter that must be supplied.
    pub fn required<F: Reflect>(name: impl Into<String>) -> ParameterInfo {
        ParameterInfo {
            name: name.into(),
            ty: TypeRef::of::<F>(),
            default: None,
        }
    }

    /// A parameter with a default used when no value is supplied.
    pub fn optional<F>(name: impl Into<String>, default: F) -> ParameterInfo
    where
        F: Reflect + Clone + Send + Sync,
    {
        ParameterInfo {
            name: name.into(),
            ty: TypeRef::of::<F>(),
            default: Some(Arc::new(move || Box::new(default.clone()) as Box<dyn Any>)),
        }
    }
}

/// Positional constructor arguments handed to a constructor closure.
pub struct Arguments {
    values: std::vec::IntoIter<Box<dyn Any>>,
}

impl Arguments {
    /// Take the next argument as `A`.
    pub fn next<A: Any>(&mut self) -> Result<A, TypeMismatch> {
        match self.values.next() {
            Some(value) => take::<A>(value),
            None => Err(TypeMismatch {
                expected: type_name::<A>(),
            }),
        }
    }
}

/// A way to create a record value.
#[derive(Clone)]
pub struct ConstructorInfo {
    pub parameters: Vec<ParameterInfo>,
    invoke: Invoker,
}

impl ConstructorInfo {
    /// Call the constructor with one argument per parameter.
    pub fn invoke(&self, arguments: Vec<Box<dyn Any>>) -> Result<Box<dyn Any>, TypeMismatch> {
        (self.invoke)(arguments)
    }
}

/// Members and constructors of a record.
#[derive(Clone)]
pub struct RecordInfo {
    pub name: String,
    pub namespace: Option<String>,
    pub members: Vec<MemberInfo>,
    pub constructors: Vec<ConstructorInfo>,
}

impl RecordInfo {
    /// Start describing record `T`.
    pub fn builder<T: Reflect>() -> RecordInfoBuilder<T> {
        let (namespace, name) = split_type_name(type_name::<T>());
        RecordInfoBuilder {
            info: RecordInfo {
                name,
                namespace,
                members: Vec::new(),
                constructors: Vec::new(),
            },
            marker: std::marker::PhantomData,
        }
    }

    pub fn fullname(&self) -> String {
        qualify(&self.name, self.namespace.as_deref())
    }

    /// Find a member by exact name.
    pub fn member(&self, name: &str) -> Option<&MemberInfo> {
        self.members.iter().find(|m| m.name == name)
    }
}

/// Builder for [`RecordInfo`].
pub struct RecordInfoBuilder<T> {
    info: RecordInfo,
    marker: std::marker::PhantomData<fn() -> T>,
}

impl<T: Reflect> RecordInfoBuilder<T> {
    /// Override the record name; a dotted name also sets the namespace.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        let (namespace, name) = split_fullname(name.into());
        self.info.name = name;
        self.info.namespace = namespace.or(self.info.namespace);
        self
    }

    /// Override the namespace.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.info.namespace = Some(namespace.into());
        self
    }

    /// Add a read-only member.
    pub fn member<F: Reflect>(mut self, name: impl Into<String>, get: fn(&T) -> &F) -> Self {
        self.info.members.push(MemberInfo {
            name: name.into(),
            ty: TypeRef::of::<F>(),
            get: getter(move |record| Ok(get(downcast::<T>(record)?) as &dyn Any)),
            set: None,
        });
        self
    }

    /// Add a readable and writable member.
    pub fn field<F: Reflect>(
        mut self,
        name: impl Into<String>,
        get: fn(&T) -> &F,
        set: fn(&mut T, F),
    ) -> Self {
        self.info.members.push(MemberInfo {
            name: name.into(),
            ty: TypeRef::of::<F>(),
            get: getter(move |record| Ok(get(downcast::<T>(record)?) as &dyn Any)),
            set: Some(Arc::new(
                move |record: &mut dyn Any, value: Box<dyn Any>| -> Result<(), TypeMismatch> {
                    let record = record.downcast_mut::<T>().ok_or(TypeMismatch {
                        expected: type_name::<T>(),
                    })?;
                    set(record, take::<F>(value)?);
                    Ok(())
                },
            )),
        });
        self
    }

    /// Add a constructor taking `parameters` in order.
    pub fn constructor<C>(mut self, parameters: Vec<ParameterInfo>, construct: C) -> Self
    where
        C: Fn(&mut Arguments) -> Result<T, TypeMismatch> + Send + Sync + 'static,
    {
        self.info.constructors.push(ConstructorInfo {
            parameters,
            invoke: Arc::new(
                move |values: Vec<Box<dyn Any>>| -> Result<Box<dyn Any>, TypeMismatch> {
                    let mut arguments = Arguments {
                        values: values.into_iter(),
                    };
                    Ok(Box::new(construct(&mut arguments)?))
                },
            ),
        });
        self
    }

    /// Add a parameterless constructor using `Default`.
    pub fn default_constructor(self) -> Self
    where
        T: Default,
    {
        self.constructor(Vec::new(), |_| Ok(T::default()))
    }

    pub fn build(self) -> TypeInfo {
        TypeInfo::Record(self.info)
    }
}

// ============================================================================
// Unions
// ============================================================================

/// One alternative of a tagged union.
#[derive(Clone)]
pub struct VariantInfo {
    pub name: String,
    pub ty: TypeRef,
    extract: OptionalGetter,
    wrap: Wrapper,
}

impl VariantInfo {
    /// Borrow the payload when the value is this variant.
    pub fn extract<'a>(&self, value: &'a dyn Any) -> Result<Option<&'a dyn Any>, TypeMismatch> {
        (self.extract)(value)
    }

    /// Build the union value from a payload.
    pub fn wrap(&self, payload: Box<dyn Any>) -> Result<Box<dyn Any>, TypeMismatch> {
        (self.wrap)(payload)
    }
}

/// Alternatives of a tagged union.
#[derive(Clone)]
pub struct UnionInfo {
    pub variants: Vec<VariantInfo>,
}

impl UnionInfo {
    /// Start describing union `T`.
    pub fn builder<T: Reflect>() -> UnionInfoBuilder<T> {
        UnionInfoBuilder {
            variants: Vec::new(),
            marker: std::marker::PhantomData,
        }
    }
}

/// Builder for [`UnionInfo`].
pub struct UnionInfoBuilder<T> {
    variants: Vec<VariantInfo>,
    marker: std::marker::PhantomData<fn() -> T>,
}

impl<T: Reflect> UnionInfoBuilder<T> {
    /// Add a variant carrying a `V`.
    pub fn variant<V: Reflect>(
        mut self,
        name: impl Into<String>,
        extract: fn(&T) -> Option<&V>,
        wrap: fn(V) -> T,
    ) -> Self {
        self.variants.push(VariantInfo {
            name: name.into(),
            ty: TypeRef::of::<V>(),
            extract: optional_getter(move |value| {
                Ok(extract(downcast::<T>(value)?).map(|v| v as &dyn Any))
            }),
            wrap: Arc::new(move |payload: Box<dyn Any>| -> Result<Box<dyn Any>, TypeMismatch> {
                Ok(Box::new(wrap(take::<V>(payload)?)))
            }),
        });
        self
    }

    pub fn build(self) -> TypeInfo {
        TypeInfo::Union(UnionInfo {
            variants: self.variants,
        })
    }
}

// ============================================================================
// Names
// ============================================================================

/// Split `a::b::Name<Args>` into namespace `a.b` and name `Name`.
pub(crate) fn split_type_name(full: &str) -> (Option<String>, String) {
    let base = full.split('<').next().unwrap_or(full);
    match base.rsplit_once("::") {
        Some((path, name)) => (Some(path.replace("::", ".")), name.to_string()),
        None => (None, base.to_string()),
    }
}

/// Split `a.b.Name` into namespace `a.b` and name `Name`.
fn split_fullname(fullname: String) -> (Option<String>, String) {
    match fullname.rsplit_once('.') {
        Some((namespace, name)) => (Some(namespace.to_string()), name.to_string()),
        None => (None, fullname),
    }
}

fn qualify(name: &str, namespace: Option<&str>) -> String {
    match namespace {
        Some(ns) if !ns.is_empty() => format!("{}.{}", ns, name),
        _ => name.to_string(),
    }
}
