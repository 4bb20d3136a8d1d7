//! The boundary between the reflector and the SPIR-V introspection frontend that parsed the shader
//! module. The reflector only ever reads from a `ReflectionSource`. `ShaderModuleIr` is an in-memory
//! implementation that a frontend can fill in directly or serialize to JSON for the command line
//! tool.

use crate::{ReflectorError, ReflectorResult};
use fnv::FnvHashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Identifier of any object in the module (types, variables)
pub type Id = u32;
pub type TypeId = Id;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BaseType {
    Unknown,
    Void,
    Boolean,
    SByte,
    UByte,
    Short,
    UShort,
    Int,
    UInt,
    Int64,
    UInt64,
    AtomicCounter,
    Half,
    Float,
    Double,
    Struct,
    Image,
    SampledImage,
    Sampler,
}

impl Default for BaseType {
    fn default() -> Self {
        BaseType::Unknown
    }
}

/// The shape of a type. Scalars have `vec_size == 1` and `columns == 1`, vectors have
/// `columns == 1`, matrices have `columns` vectors of `vec_size` components. `width` is the bit
/// width of a single component.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeDescriptor {
    #[serde(rename = "type_name")]
    pub base_type: BaseType,
    #[serde(rename = "bit_width")]
    pub width: u32,
    pub vec_size: u32,
    pub columns: u32,
}

impl TypeDescriptor {
    pub fn new(
        base_type: BaseType,
        width: u32,
        vec_size: u32,
        columns: u32,
    ) -> Self {
        TypeDescriptor {
            base_type,
            width,
            vec_size,
            columns,
        }
    }

    pub fn scalar(
        base_type: BaseType,
        width: u32,
    ) -> Self {
        Self::new(base_type, width, 1, 1)
    }

    /// Size of the type as declared in the shader, ignoring any host representation
    pub fn declared_byte_length(&self) -> ReflectorResult<usize> {
        let bit_width = (self.width as usize)
            .checked_mul(self.vec_size as usize)
            .and_then(|x| x.checked_mul(self.columns as usize))
            .ok_or(ReflectorError::TypeSizeOverflow(*self))?;
        Ok(bit_width / 8)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParsedType {
    pub id: TypeId,
    /// Set when this entry is a variation (pointer, array, etc.) of another type in the table.
    /// Variations share the identity of the type they derive from.
    #[serde(default)]
    pub derived_from: Option<TypeId>,
    #[serde(flatten)]
    pub descriptor: TypeDescriptor,
    #[serde(default)]
    pub member_types: Vec<TypeId>,
    /// Points at the canonical type if this type is an alias of it
    #[serde(default)]
    pub type_alias: Option<TypeId>,
}

impl ParsedType {
    pub fn identity(&self) -> TypeId {
        self.derived_from.unwrap_or(self.id)
    }

    pub fn is_struct(&self) -> bool {
        self.descriptor.base_type == BaseType::Struct
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExecutionModel {
    Vertex,
    TessellationControl,
    TessellationEvaluation,
    Geometry,
    Fragment,
    GlCompute,
    Kernel,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPoint {
    pub name: String,
    pub execution_model: ExecutionModel,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: Id,
    pub type_id: TypeId,
    #[serde(default)]
    pub base_type_id: TypeId,
    #[serde(default)]
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderResources {
    pub uniform_buffers: Vec<Resource>,
    pub stage_inputs: Vec<Resource>,
    pub stage_outputs: Vec<Resource>,
    pub sampled_images: Vec<Resource>,
    pub separate_images: Vec<Resource>,
    pub separate_samplers: Vec<Resource>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Decoration {
    DescriptorSet,
    Binding,
    Location,
    Index,
}

/// The four automatically assigned Metal resource binding slots of a resource
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MslResourceSlot {
    Primary,
    Secondary,
    Tertiary,
    Quaternary,
}

impl MslResourceSlot {
    pub const ALL: [MslResourceSlot; 4] = [
        MslResourceSlot::Primary,
        MslResourceSlot::Secondary,
        MslResourceSlot::Tertiary,
        MslResourceSlot::Quaternary,
    ];

    pub fn index(self) -> usize {
        match self {
            MslResourceSlot::Primary => 0,
            MslResourceSlot::Secondary => 1,
            MslResourceSlot::Tertiary => 2,
            MslResourceSlot::Quaternary => 3,
        }
    }
}

/// Reported by frontends for slots that were never assigned
pub const UNASSIGNED_MSL_RESOURCE_BINDING: u32 = u32::MAX;

fn unassigned_msl_resource_bindings() -> [u32; 4] {
    [UNASSIGNED_MSL_RESOURCE_BINDING; 4]
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDecorations {
    #[serde(default)]
    pub descriptor_set: u32,
    #[serde(default)]
    pub binding: u32,
    #[serde(default)]
    pub location: u32,
    #[serde(default)]
    pub index: u32,
    #[serde(default = "unassigned_msl_resource_bindings")]
    pub msl_resource_bindings: [u32; 4],
}

impl Default for ResourceDecorations {
    fn default() -> Self {
        ResourceDecorations {
            descriptor_set: 0,
            binding: 0,
            location: 0,
            index: 0,
            msl_resource_bindings: unassigned_msl_resource_bindings(),
        }
    }
}

/// Everything the reflector needs to know about a parsed shader module
pub trait ReflectionSource {
    fn entry_points(&self) -> &[EntryPoint];

    fn shader_resources(&self) -> &ShaderResources;

    /// Ids of every entry in the type table in encounter order. Several entries may share the
    /// same identity.
    fn type_ids(&self) -> Vec<TypeId>;

    fn get_type(
        &self,
        type_id: TypeId,
    ) -> ReflectorResult<&ParsedType>;

    /// Debug name of a type or variable, empty if there is none
    fn get_name(
        &self,
        id: Id,
    ) -> &str;

    /// Debug name of the member at `index` declared directly on `type_id`
    fn get_member_name(
        &self,
        type_id: TypeId,
        index: usize,
    ) -> Option<&str>;

    /// Decorations that were never set read as 0
    fn get_decoration(
        &self,
        id: Id,
        decoration: Decoration,
    ) -> u32;

    fn get_automatic_msl_resource_binding(
        &self,
        id: Id,
        slot: MslResourceSlot,
    ) -> u32;
}

/// The module's type table. Keeps encounter order and indexes entries by id. If an id appears more
/// than once, lookups return the first entry.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<ParsedType>", into = "Vec<ParsedType>")]
pub struct TypeTable {
    types: Vec<ParsedType>,
    index_by_id: FnvHashMap<TypeId, usize>,
}

impl TypeTable {
    pub fn push(
        &mut self,
        ty: ParsedType,
    ) {
        self.index_by_id.entry(ty.id).or_insert(self.types.len());
        self.types.push(ty);
    }

    pub fn get(
        &self,
        type_id: TypeId,
    ) -> Option<&ParsedType> {
        self.index_by_id.get(&type_id).map(|&index| &self.types[index])
    }

    /// Changing the id of the returned entry leaves the index stale
    pub fn get_mut(
        &mut self,
        type_id: TypeId,
    ) -> Option<&mut ParsedType> {
        let index = *self.index_by_id.get(&type_id)?;
        Some(&mut self.types[index])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ParsedType> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl From<Vec<ParsedType>> for TypeTable {
    fn from(types: Vec<ParsedType>) -> Self {
        let mut table = TypeTable::default();
        for ty in types {
            table.push(ty);
        }
        table
    }
}

impl From<TypeTable> for Vec<ParsedType> {
    fn from(table: TypeTable) -> Self {
        table.types
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ShaderModuleIr {
    pub entry_points: Vec<EntryPoint>,
    pub types: TypeTable,
    #[serde(default)]
    pub names: FnvHashMap<Id, String>,
    #[serde(default)]
    pub member_names: FnvHashMap<TypeId, Vec<String>>,
    #[serde(default)]
    pub decorations: FnvHashMap<Id, ResourceDecorations>,
    #[serde(default)]
    pub resources: ShaderResources,
}

impl ShaderModuleIr {
    pub fn from_json(json: &str) -> ReflectorResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> ReflectorResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

impl ReflectionSource for ShaderModuleIr {
    fn entry_points(&self) -> &[EntryPoint] {
        &self.entry_points
    }

    fn shader_resources(&self) -> &ShaderResources {
        &self.resources
    }

    fn type_ids(&self) -> Vec<TypeId> {
        self.types.iter().map(|x| x.id).collect()
    }

    fn get_type(
        &self,
        type_id: TypeId,
    ) -> ReflectorResult<&ParsedType> {
        self.types
            .get(type_id)
            .ok_or(ReflectorError::UnknownType(type_id))
    }

    fn get_name(
        &self,
        id: Id,
    ) -> &str {
        self.names.get(&id).map(|x| x.as_str()).unwrap_or("")
    }

    fn get_member_name(
        &self,
        type_id: TypeId,
        index: usize,
    ) -> Option<&str> {
        self.member_names
            .get(&type_id)?
            .get(index)
            .map(|x| x.as_str())
            .filter(|x| !x.is_empty())
    }

    fn get_decoration(
        &self,
        id: Id,
        decoration: Decoration,
    ) -> u32 {
        let decorations = match self.decorations.get(&id) {
            Some(decorations) => decorations,
            None => return 0,
        };

        match decoration {
            Decoration::DescriptorSet => decorations.descriptor_set,
            Decoration::Binding => decorations.binding,
            Decoration::Location => decorations.location,
            Decoration::Index => decorations.index,
        }
    }

    fn get_automatic_msl_resource_binding(
        &self,
        id: Id,
        slot: MslResourceSlot,
    ) -> u32 {
        self.decorations
            .get(&id)
            .map(|x| x.msl_resource_bindings[slot.index()])
            .unwrap_or(UNASSIGNED_MSL_RESOURCE_BINDING)
    }
}
