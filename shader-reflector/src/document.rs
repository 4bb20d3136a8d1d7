use crate::ir::{ExecutionModel, TypeDescriptor};
use crate::ReflectorResult;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Unsupported,
}

impl ShaderStage {
    pub fn from_execution_model(execution_model: ExecutionModel) -> Self {
        match execution_model {
            ExecutionModel::Vertex => ShaderStage::Vertex,
            ExecutionModel::Fragment => ShaderStage::Fragment,
            _ => ShaderStage::Unsupported,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
            ShaderStage::Unsupported => "unsupported",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructMember {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub offset: usize,
    pub byte_length: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructDefinition {
    pub name: String,
    pub byte_length: usize,
    pub members: Vec<StructMember>,
}

impl StructDefinition {
    /// True if every member starts where the previous one ended and the members account for the
    /// whole struct
    pub fn is_tightly_packed(&self) -> bool {
        let mut offset = 0;
        for member in &self.members {
            if member.offset != offset {
                return false;
            }
            offset += member.byte_length;
        }

        offset == self.byte_length
    }
}

/// Automatically assigned Metal binding slots, copied through as reported by the frontend
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MslResourceBindings {
    pub msl_res_0: u32,
    pub msl_res_1: u32,
    pub msl_res_2: u32,
    pub msl_res_3: u32,
}

impl From<[u32; 4]> for MslResourceBindings {
    fn from(slots: [u32; 4]) -> Self {
        MslResourceBindings {
            msl_res_0: slots[0],
            msl_res_1: slots[1],
            msl_res_2: slots[2],
            msl_res_3: slots[3],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShaderResource {
    pub name: String,
    pub descriptor_set: u32,
    pub binding: u32,
    pub location: u32,
    pub index: u32,
    #[serde(flatten)]
    pub msl_resource_bindings: MslResourceBindings,
    #[serde(rename = "type")]
    pub reflected_type: TypeDescriptor,
}

/// Everything a template renderer needs to produce bindings for one shader module
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub entrypoint: String,
    pub shader_name: String,
    pub shader_stage: ShaderStage,
    pub header_file_name: String,
    pub uniform_buffers: Vec<ShaderResource>,
    pub stage_inputs: Vec<ShaderResource>,
    /// Combined sampled images, then separate images, then separate samplers
    pub sampled_images: Vec<ShaderResource>,
    pub stage_outputs: Vec<ShaderResource>,
    /// The per-vertex struct comes first when one was synthesized
    pub struct_definitions: Vec<StructDefinition>,
}

impl Document {
    pub fn to_json(&self) -> ReflectorResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
