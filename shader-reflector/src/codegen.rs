use crate::document::{Document, ShaderResource, StructDefinition};
use crate::ReflectorResult;
use fnv::FnvHashSet;
use heck::{CamelCase, ShoutySnakeCase, SnakeCase};

/// Turns a reflected document into source text. The reflector produces one header (the bindings
/// themselves) and one source file per shader.
pub trait TemplateRenderer {
    fn render_header(
        &self,
        document: &Document,
    ) -> ReflectorResult<String>;

    fn render_source(
        &self,
        document: &Document,
    ) -> ReflectorResult<String>;
}

pub fn camel_case(name: &str) -> String {
    name.to_camel_case()
}

/// Maps a document's `shader_stage` to the variant of the generated `ShaderStage` enum
pub fn to_shader_stage(shader_stage: &str) -> &'static str {
    match shader_stage {
        "vertex" => "ShaderStage::Vertex",
        "fragment" => "ShaderStage::Fragment",
        _ => "ShaderStage::Unknown",
    }
}

/// Emits rust bindings. The header is a module containing the host types, binding constants and
/// `#[repr(C, packed)]` mirrors of every reflected struct. The source is a test module, meant to be
/// declared as a child of the header module, that checks the size and offset of every member.
#[derive(Default)]
pub struct RustBindingsRenderer;

impl TemplateRenderer for RustBindingsRenderer {
    fn render_header(
        &self,
        document: &Document,
    ) -> ReflectorResult<String> {
        let mut rust_code = Vec::<String>::default();

        rust_header(&mut rust_code, document);
        rust_prelude(&mut rust_code);
        rust_shader_constants(&mut rust_code, document);
        rust_binding_constants(&mut rust_code, document);

        for s in &document.struct_definitions {
            rust_code.push(generate_struct_code(s));
        }

        Ok(rust_code.concat())
    }

    fn render_source(
        &self,
        document: &Document,
    ) -> ReflectorResult<String> {
        let mut rust_code = Vec::<String>::default();

        rust_header(&mut rust_code, document);
        rust_code.push("#![cfg(test)]\n\n".to_string());
        rust_code.push("#[allow(unused_imports)]\n".to_string());
        rust_code.push("use super::*;\n".to_string());

        for s in &document.struct_definitions {
            rust_code.push(generate_struct_test_code(s));
        }

        Ok(rust_code.concat())
    }
}

fn rust_header(
    rust_code: &mut Vec<String>,
    document: &Document,
) {
    rust_code.push(format!(
        "// This code is auto-generated by the shader reflector from {} ({}).\n\n",
        document.shader_name, document.header_file_name
    ));
}

fn rust_prelude(rust_code: &mut Vec<String>) {
    rust_code.push("#![allow(dead_code)]\n\n".to_string());
    rust_code.push("pub type Matrix = [f32; 16];\n".to_string());
    rust_code.push("pub type Point = [f32; 2];\n".to_string());
    rust_code.push("pub type Vector3 = [f32; 3];\n".to_string());
    rust_code.push("pub type Vector4 = [f32; 4];\n\n".to_string());
    rust_code.push(
        "#[derive(Copy, Clone, Debug)]\n#[repr(C, packed)]\npub struct Padding<const N: usize>(pub [u8; N]);\n\n"
            .to_string(),
    );
    rust_code.push(
        "#[derive(Copy, Clone, Debug, PartialEq, Eq)]\npub enum ShaderStage {\n    Unknown,\n    Vertex,\n    Fragment,\n}\n\n"
            .to_string(),
    );
}

fn rust_shader_constants(
    rust_code: &mut Vec<String>,
    document: &Document,
) {
    rust_code.push(format!(
        "pub const SHADER_NAME: &str = {:?};\n",
        document.shader_name
    ));
    rust_code.push(format!(
        "pub const ENTRYPOINT: &str = {:?};\n",
        document.entrypoint
    ));
    rust_code.push(format!(
        "pub const SHADER_STAGE: ShaderStage = {};\n\n",
        to_shader_stage(document.shader_stage.as_str())
    ));
}

/// Hands out constant name prefixes, never the same one twice
#[derive(Default)]
struct ConstantPrefixes {
    used: FnvHashSet<String>,
}

impl ConstantPrefixes {
    fn prefix(
        &mut self,
        resource: &ShaderResource,
    ) -> String {
        let mut base = resource.name.to_shouty_snake_case();
        if base.is_empty() {
            base = "UNNAMED".to_string();
        }

        let mut prefix = base.clone();
        let mut suffix = 1;
        while !self.used.insert(prefix.clone()) {
            prefix = format!("{}_{}", base, suffix);
            suffix += 1;
        }

        prefix
    }
}

fn rust_binding_constants(
    rust_code: &mut Vec<String>,
    document: &Document,
) {
    // Descriptor constants of buffers and images share a namespace. Input and output constants
    // have their own suffix.
    let mut descriptor_prefixes = ConstantPrefixes::default();
    for resource in document
        .uniform_buffers
        .iter()
        .chain(document.sampled_images.iter())
    {
        let prefix = descriptor_prefixes.prefix(resource);
        rust_code.push(format!(
            "pub const {}_DESCRIPTOR_SET_INDEX: usize = {};\n",
            prefix, resource.descriptor_set
        ));
        rust_code.push(format!(
            "pub const {}_DESCRIPTOR_BINDING_INDEX: usize = {};\n",
            prefix, resource.binding
        ));
        let msl = &resource.msl_resource_bindings;
        rust_code.push(format!(
            "pub const {}_MSL_RESOURCE_BINDINGS: [u32; 4] = [{}, {}, {}, {}];\n",
            prefix, msl.msl_res_0, msl.msl_res_1, msl.msl_res_2, msl.msl_res_3
        ));
    }

    let mut input_prefixes = ConstantPrefixes::default();
    for resource in &document.stage_inputs {
        rust_code.push(format!(
            "pub const {}_INPUT_LOCATION: usize = {};\n",
            input_prefixes.prefix(resource),
            resource.location
        ));
    }

    let mut output_prefixes = ConstantPrefixes::default();
    for resource in &document.stage_outputs {
        rust_code.push(format!(
            "pub const {}_OUTPUT_LOCATION: usize = {};\n",
            output_prefixes.prefix(resource),
            resource.location
        ));
    }

    rust_code.push("\n".to_string());
}

fn generate_struct_code(st: &StructDefinition) -> String {
    let mut result_string = String::default();
    result_string += &format!(
        "#[derive(Copy, Clone, Debug)]\n#[repr(C, packed)]\n#[allow(non_snake_case)]\npub struct {} {{\n",
        camel_case(&st.name)
    );
    for m in &st.members {
        result_string += &format_member(&m.name, &m.type_name, m.offset, m.byte_length);
    }
    result_string += &format!("}} // {} bytes\n\n", st.byte_length);
    result_string
}

fn generate_struct_test_code(st: &StructDefinition) -> String {
    let struct_name = camel_case(&st.name);
    let mut result_string = String::default();
    result_string += &format!(
        "\n#[test]\nfn test_struct_{}() {{\n",
        st.name.to_snake_case()
    );
    result_string += &format!(
        "    assert_eq!(std::mem::size_of::<{}>(), {});\n",
        struct_name, st.byte_length
    );
    for m in &st.members {
        result_string += &format!(
            "    assert_eq!(std::mem::size_of::<{}>(), {});\n",
            m.type_name, m.byte_length
        );
        result_string += &format!(
            "    assert_eq!(memoffset::offset_of!({}, {}), {});\n",
            struct_name, m.name, m.offset
        );
    }
    result_string += "}\n";
    result_string
}

fn format_member(
    name: &str,
    ty: &str,
    offset: usize,
    size: usize,
) -> String {
    let mut str = format!("    pub {}: {}, ", name, ty);
    let whitespace = 40_usize.saturating_sub(str.len());
    str += " ".repeat(whitespace).as_str();
    str += &format!("// +{} (size: {})\n", offset, size);
    str
}
