//! Type interning for structural deduplication.
//!
//! Converts `TypeKey` structures into lightweight `TypeId` handles.
//! Structurally identical types get the same id, so equality anywhere in
//! the solver is a u32 compare and hash-set membership is cheap.

use crate::interner::{Atom, StringInterner};
use crate::solver::def::{DefId, Definition, DefinitionStore};
use crate::solver::types::*;
use crate::solver::TypeDatabase;
use rustc_hash::FxHashMap;
use std::hash::Hash;
use std::sync::{Arc, RwLock};

struct SliceInterner<T> {
    items: Vec<Arc<[T]>>,
    map: FxHashMap<Arc<[T]>, u32>,
}

impl<T> SliceInterner<T>
where
    T: Eq + Hash,
{
    fn new() -> Self {
        let empty: Arc<[T]> = Arc::from(Vec::new());
        let mut map = FxHashMap::default();
        map.insert(empty.clone(), 0);
        SliceInterner {
            items: vec![empty],
            map,
        }
    }

    fn intern(&mut self, items: Vec<T>) -> u32 {
        if items.is_empty() {
            return 0;
        }
        if let Some(&id) = self.map.get(items.as_slice()) {
            return id;
        }
        let arc: Arc<[T]> = items.into();
        let id = self.items.len() as u32;
        self.items.push(arc.clone());
        self.map.insert(arc, id);
        id
    }

    fn get(&self, id: u32) -> Option<Arc<[T]>> {
        self.items.get(id as usize).cloned()
    }

    fn empty(&self) -> Arc<[T]> {
        self.items[0].clone()
    }
}

struct ValueInterner<T> {
    items: Vec<Arc<T>>,
    map: FxHashMap<Arc<T>, u32>,
}

impl<T> ValueInterner<T>
where
    T: Eq + Hash,
{
    fn new() -> Self {
        ValueInterner {
            items: Vec::new(),
            map: FxHashMap::default(),
        }
    }

    fn intern(&mut self, value: T) -> u32 {
        if let Some(&id) = self.map.get(&value) {
            return id;
        }
        let arc = Arc::new(value);
        let id = self.items.len() as u32;
        self.items.push(arc.clone());
        self.map.insert(arc, id);
        id
    }

    fn get(&self, id: u32) -> Option<Arc<T>> {
        self.items.get(id as usize).cloned()
    }
}

/// Well-known definitions the host registers so the solver can apply the
/// rank-1 array-interface rules. Unregistered entries simply disable the
/// corresponding rule.
#[derive(Clone, Debug, Default)]
pub struct WellKnownDefs {
    pub ienumerable: Option<DefId>,
    pub icollection: Option<DefId>,
    pub ilist: Option<DefId>,
    pub ireadonly_collection: Option<DefId>,
    pub ireadonly_list: Option<DefId>,
}

impl WellKnownDefs {
    pub fn array_interfaces(&self) -> impl Iterator<Item = DefId> + '_ {
        [
            self.ienumerable,
            self.icollection,
            self.ilist,
            self.ireadonly_collection,
            self.ireadonly_list,
        ]
        .into_iter()
        .flatten()
    }
}

/// Type interning table.
/// Thread-safe via RwLock for shared `&self` access while building types.
pub struct TypeInterner {
    key_to_id: RwLock<FxHashMap<TypeKey, TypeId>>,
    id_to_key: RwLock<Vec<TypeKey>>,
    strings: StringInterner,
    type_lists: RwLock<SliceInterner<TypeId>>,
    tuple_lists: RwLock<SliceInterner<TupleElement>>,
    function_shapes: RwLock<ValueInterner<FunctionShape>>,
    applications: RwLock<ValueInterner<TypeApplication>>,
    defs: DefinitionStore,
    well_known: RwLock<WellKnownDefs>,
}

impl TypeInterner {
    /// Create a new type interner with pre-registered intrinsics.
    pub fn new() -> Self {
        let interner = TypeInterner {
            key_to_id: RwLock::new(FxHashMap::default()),
            id_to_key: RwLock::new(Vec::new()),
            strings: StringInterner::new(),
            type_lists: RwLock::new(SliceInterner::new()),
            tuple_lists: RwLock::new(SliceInterner::new()),
            function_shapes: RwLock::new(ValueInterner::new()),
            applications: RwLock::new(ValueInterner::new()),
            defs: DefinitionStore::new(),
            well_known: RwLock::new(WellKnownDefs::default()),
        };
        interner.register_intrinsics();
        interner
    }

    fn register_intrinsics(&self) {
        let mut keys = self.id_to_key.write().expect("id_to_key lock poisoned");
        let mut map = self.key_to_id.write().expect("key_to_id lock poisoned");

        // Reserve the full intrinsic range so user ids start at FIRST_USER.
        keys.resize(TypeId::FIRST_USER as usize, TypeKey::Error(None));

        let intrinsics = [
            IntrinsicKind::Void,
            IntrinsicKind::Object,
            IntrinsicKind::Dynamic,
            IntrinsicKind::Bool,
            IntrinsicKind::Char,
            IntrinsicKind::SByte,
            IntrinsicKind::Byte,
            IntrinsicKind::Short,
            IntrinsicKind::UShort,
            IntrinsicKind::Int,
            IntrinsicKind::UInt,
            IntrinsicKind::Long,
            IntrinsicKind::ULong,
            IntrinsicKind::Float,
            IntrinsicKind::Double,
            IntrinsicKind::Decimal,
            IntrinsicKind::String,
        ];
        for kind in intrinsics {
            let id = kind.to_type_id();
            keys[id.0 as usize] = TypeKey::Intrinsic(kind);
            map.insert(TypeKey::Intrinsic(kind), id);
        }
        keys[TypeId::ERROR.0 as usize] = TypeKey::Error(None);
        map.insert(TypeKey::Error(None), TypeId::ERROR);
    }

    pub fn definitions(&self) -> &DefinitionStore {
        &self.defs
    }

    pub fn set_well_known(&self, well_known: WellKnownDefs) {
        *self.well_known.write().expect("well_known lock poisoned") = well_known;
    }

    pub fn well_known(&self) -> WellKnownDefs {
        self.well_known
            .read()
            .expect("well_known lock poisoned")
            .clone()
    }
}

impl Default for TypeInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeDatabase for TypeInterner {
    fn lookup(&self, id: TypeId) -> Option<TypeKey> {
        if id == TypeId::NONE {
            return None;
        }
        self.id_to_key
            .read()
            .expect("id_to_key lock poisoned")
            .get(id.0 as usize)
            .cloned()
    }

    fn intern(&self, key: TypeKey) -> TypeId {
        if let Some(&id) = self
            .key_to_id
            .read()
            .expect("key_to_id lock poisoned")
            .get(&key)
        {
            return id;
        }

        let mut map = self.key_to_id.write().expect("key_to_id lock poisoned");
        if let Some(&id) = map.get(&key) {
            return id;
        }
        let mut keys = self.id_to_key.write().expect("id_to_key lock poisoned");
        let id = TypeId(keys.len() as u32);
        keys.push(key.clone());
        map.insert(key, id);
        id
    }

    fn type_list(&self, id: TypeListId) -> Arc<[TypeId]> {
        let lists = self.type_lists.read().expect("type_lists lock poisoned");
        lists.get(id.0).unwrap_or_else(|| lists.empty())
    }

    fn intern_type_list(&self, items: Vec<TypeId>) -> TypeListId {
        TypeListId(
            self.type_lists
                .write()
                .expect("type_lists lock poisoned")
                .intern(items),
        )
    }

    fn tuple_list(&self, id: TupleListId) -> Arc<[TupleElement]> {
        let lists = self.tuple_lists.read().expect("tuple_lists lock poisoned");
        lists.get(id.0).unwrap_or_else(|| lists.empty())
    }

    fn intern_tuple_list(&self, items: Vec<TupleElement>) -> TupleListId {
        TupleListId(
            self.tuple_lists
                .write()
                .expect("tuple_lists lock poisoned")
                .intern(items),
        )
    }

    fn function_shape(&self, id: FunctionShapeId) -> Option<Arc<FunctionShape>> {
        self.function_shapes
            .read()
            .expect("function_shapes lock poisoned")
            .get(id.0)
    }

    fn intern_function_shape(&self, shape: FunctionShape) -> FunctionShapeId {
        FunctionShapeId(
            self.function_shapes
                .write()
                .expect("function_shapes lock poisoned")
                .intern(shape),
        )
    }

    fn application(&self, id: AppId) -> Option<Arc<TypeApplication>> {
        self.applications
            .read()
            .expect("applications lock poisoned")
            .get(id.0)
    }

    fn intern_application(&self, app: TypeApplication) -> AppId {
        AppId(
            self.applications
                .write()
                .expect("applications lock poisoned")
                .intern(app),
        )
    }

    fn definition(&self, id: DefId) -> Option<Arc<Definition>> {
        self.defs.get(id)
    }

    fn array_interface_defs(&self) -> Vec<DefId> {
        self.well_known().array_interfaces().collect()
    }

    fn intern_name(&self, text: &str) -> Atom {
        self.strings.intern(text)
    }

    fn resolve_name(&self, atom: Atom) -> Arc<str> {
        self.strings.resolve(atom)
    }
}

#[cfg(test)]
#[path = "tests/intern_tests.rs"]
mod tests;
