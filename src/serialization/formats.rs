//! The formats registry.
//!
//! A [`Formats`] is a stack of layers. Each layer maps a native type to an
//! entry holding at most one extractor and at most one serializer. A layer may
//! have base layers; lookup checks the layer's own entries first and then its
//! bases, later bases before earlier ones, depth first. The first layer with
//! an entry for the type decides the result, so an entry that only has an
//! extractor hides a serializer for the same type in a base layer.
//!
//! # Lifecycle
//!
//! Registration requires `&mut Formats`. A formats value shares its layers
//! with its clones and with every formats composed from it; registering into
//! a shared formats first detaches its own layer, so published registries are
//! never modified underneath their readers. Two formats are equal when they
//! share the same top layer.

use std::any::TypeId;
use std::fmt;
use std::sync::{Arc, LazyLock};

use arc_swap::ArcSwap;
use rustc_hash::FxHashMap;

use crate::error::{Error, Result, Role};
use crate::validate::validate;
use crate::value::Value;

use super::capability::{
    Adapter, DynSerializer, ErasedExtractor, ErasedSerializer, Extractor, Serializer,
};
use super::context::{ExtractionContext, SerializationContext};
use super::defaults;
use super::type_info::TypeInfo;

/// What to do when a type is registered twice in the same layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateTypeAction {
    /// Keep the existing registration and discard the new one
    Ignore,
    /// Replace the existing registration
    Replace,
    /// Fail with [`Error::DuplicateType`]
    #[default]
    Exception,
}

#[derive(Clone, Default)]
struct Entry {
    extractor: Option<ErasedExtractor>,
    serializer: Option<Arc<dyn DynSerializer>>,
}

#[derive(Clone, Default)]
struct Layer {
    entries: FxHashMap<TypeId, Entry>,
    bases: Vec<Arc<Layer>>,
}

impl Layer {
    fn find(&self, id: TypeId) -> Option<&Entry> {
        if let Some(entry) = self.entries.get(&id) {
            return Some(entry);
        }
        self.bases.iter().rev().find_map(|base| base.find(id))
    }

    fn count(&self) -> usize {
        self.entries.len() + self.bases.iter().map(|b| b.count()).sum::<usize>()
    }
}

static DEFAULTS: LazyLock<Formats> = LazyLock::new(defaults::build_defaults);

static COERCE: LazyLock<Formats> = LazyLock::new(defaults::build_coerce);

static GLOBAL: LazyLock<ArcSwap<Layer>> =
    LazyLock::new(|| ArcSwap::new(DEFAULTS.layer.clone()));

/// A composable registry of extractors and serializers.
#[derive(Clone, Default)]
pub struct Formats {
    layer: Arc<Layer>,
}

impl Formats {
    /// An empty formats with no bases.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adapters for the primitive types with strict kind checking: `bool`,
    /// every fixed-width integer plus `usize`/`isize` (range checked),
    /// `f32`/`f64` (integers widen), `String`, `char` and [`Value`].
    pub fn defaults() -> Self {
        DEFAULTS.clone()
    }

    /// The defaults plus a layer of lenient adapters for `bool`, integers,
    /// decimals and `String` that convert between kinds instead of failing.
    pub fn coerce() -> Self {
        COERCE.clone()
    }

    /// The process-wide formats, initially [`Formats::defaults`].
    pub fn global() -> Self {
        Self {
            layer: GLOBAL.load_full(),
        }
    }

    /// Replace the process-wide formats, returning the previous one.
    pub fn set_global(formats: Formats) -> Formats {
        let previous = GLOBAL.swap(formats.layer);
        tracing::debug!(types = previous.count(), "global formats replaced");
        Formats { layer: previous }
    }

    /// Restore the process-wide formats to the defaults.
    pub fn reset_global() -> Formats {
        Self::set_global(Self::defaults())
    }

    /// A new empty layer over `bases`. Later bases take precedence over
    /// earlier ones, so `compose([inner, outer])` prefers `outer`.
    pub fn compose<I>(bases: I) -> Self
    where
        I: IntoIterator<Item = Formats>,
    {
        Self {
            layer: Arc::new(Layer {
                entries: FxHashMap::default(),
                bases: bases.into_iter().map(|f| f.layer).collect(),
            }),
        }
    }

    /// A new formats in which `self` takes precedence over `base`.
    pub fn extend(&self, base: &Formats) -> Self {
        Self::compose([base.clone(), self.clone()])
    }

    fn own_layer(&mut self) -> &mut Layer {
        Arc::make_mut(&mut self.layer)
    }

    /// Register an extractor in this formats' own layer.
    pub fn register_extractor<E: Extractor>(
        &mut self,
        extractor: E,
        action: DuplicateTypeAction,
    ) -> Result<()> {
        self.insert(Some(ErasedExtractor::new(Arc::new(extractor))), None, action)
    }

    /// Register a serializer in this formats' own layer.
    pub fn register_serializer<S: Serializer>(
        &mut self,
        serializer: S,
        action: DuplicateTypeAction,
    ) -> Result<()> {
        let erased: Arc<dyn DynSerializer> = Arc::new(ErasedSerializer::new(Arc::new(serializer)));
        self.insert(None, Some(erased), action)
    }

    /// Register both directions of an adapter. With
    /// [`DuplicateTypeAction::Exception`] nothing is registered if either
    /// direction collides.
    pub fn register_adapter<A: Adapter>(&mut self, adapter: A, action: DuplicateTypeAction) -> Result<()> {
        let shared = Arc::new(adapter);
        let erased: Arc<dyn DynSerializer> = Arc::new(ErasedSerializer::new(shared.clone()));
        self.insert(Some(ErasedExtractor::new(shared)), Some(erased), action)
    }

    fn insert(
        &mut self,
        extractor: Option<ErasedExtractor>,
        serializer: Option<Arc<dyn DynSerializer>>,
        action: DuplicateTypeAction,
    ) -> Result<()> {
        if action == DuplicateTypeAction::Exception {
            self.check_duplicate(extractor.as_ref(), serializer.as_ref())?;
        }
        self.store(extractor, serializer, action);
        Ok(())
    }

    fn check_duplicate(
        &self,
        extractor: Option<&ErasedExtractor>,
        serializer: Option<&Arc<dyn DynSerializer>>,
    ) -> Result<()> {
        let Some(type_info) = entry_type(extractor, serializer) else {
            return Ok(());
        };
        let Some(existing) = self.layer.entries.get(&type_info.id()) else {
            return Ok(());
        };
        if extractor.is_some() && existing.extractor.is_some() {
            return Err(Error::DuplicateType {
                role: Role::Extractor,
                type_info,
            });
        }
        if serializer.is_some() && existing.serializer.is_some() {
            return Err(Error::DuplicateType {
                role: Role::Serializer,
                type_info,
            });
        }
        Ok(())
    }

    fn store(
        &mut self,
        extractor: Option<ErasedExtractor>,
        serializer: Option<Arc<dyn DynSerializer>>,
        action: DuplicateTypeAction,
    ) {
        let Some(type_info) = entry_type(extractor.as_ref(), serializer.as_ref()) else {
            return;
        };
        let replace = action == DuplicateTypeAction::Replace;
        let entry = self.own_layer().entries.entry(type_info.id()).or_default();
        if let Some(e) = extractor {
            match entry.extractor {
                None => entry.extractor = Some(e),
                Some(_) if replace => {
                    tracing::debug!(type_name = %type_info, "replacing registered extractor");
                    entry.extractor = Some(e);
                }
                Some(_) => tracing::trace!(type_name = %type_info, "ignoring duplicate extractor"),
            }
        }
        if let Some(s) = serializer {
            match entry.serializer {
                None => entry.serializer = Some(s),
                Some(_) if replace => {
                    tracing::debug!(type_name = %type_info, "replacing registered serializer");
                    entry.serializer = Some(s);
                }
                Some(_) => tracing::trace!(type_name = %type_info, "ignoring duplicate serializer"),
            }
        }
    }

    /// Register an adapter that cannot collide, such as the built-in layers.
    pub(crate) fn put_adapter<A: Adapter>(&mut self, adapter: A) {
        let shared = Arc::new(adapter);
        let erased: Arc<dyn DynSerializer> = Arc::new(ErasedSerializer::new(shared.clone()));
        self.store(
            Some(ErasedExtractor::new(shared)),
            Some(erased),
            DuplicateTypeAction::Replace,
        );
    }

    /// Look up the extractor for `T`.
    pub fn get_extractor<T: 'static>(&self) -> Result<Arc<dyn Extractor<Output = T>>> {
        self.layer
            .find(TypeId::of::<T>())
            .and_then(|entry| entry.extractor.as_ref())
            .ok_or_else(|| Error::NoExtractor {
                type_info: TypeInfo::of::<T>(),
            })?
            .typed::<T>()
    }

    /// Look up the serializer for the type identified by `type_info`.
    pub fn get_serializer(&self, type_info: TypeInfo) -> Result<Arc<dyn DynSerializer>> {
        self.layer
            .find(type_info.id())
            .and_then(|entry| entry.serializer.clone())
            .ok_or(Error::NoSerializer { type_info })
    }

    /// Returns true if an extractor for the type can be found.
    pub fn has_extractor(&self, type_info: TypeInfo) -> bool {
        self.layer
            .find(type_info.id())
            .is_some_and(|entry| entry.extractor.is_some())
    }

    /// Returns true if a serializer for the type can be found.
    pub fn has_serializer(&self, type_info: TypeInfo) -> bool {
        self.layer
            .find(type_info.id())
            .is_some_and(|entry| entry.serializer.is_some())
    }

    /// Extract a `T` from `from` with an empty version and root path.
    pub fn extract<T: 'static>(&self, from: &Value) -> Result<T> {
        ExtractionContext::new(self).extract(from)
    }

    /// Serialize `from` and validate the produced tree.
    pub fn to_json<T: 'static>(&self, from: &T) -> Result<Value> {
        let value = SerializationContext::new(self).to_json(from)?;
        validate(&value)?;
        Ok(value)
    }
}

fn entry_type(
    extractor: Option<&ErasedExtractor>,
    serializer: Option<&Arc<dyn DynSerializer>>,
) -> Option<TypeInfo> {
    match (extractor, serializer) {
        (Some(e), _) => Some(e.output_type()),
        (None, Some(s)) => Some(s.input_type()),
        (None, None) => None,
    }
}

impl PartialEq for Formats {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.layer, &other.layer)
    }
}

impl Eq for Formats {}

impl fmt::Debug for Formats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Formats")
            .field("own_types", &self.layer.entries.len())
            .field("bases", &self.layer.bases.len())
            .field("total_types", &self.layer.count())
            .finish()
    }
}
