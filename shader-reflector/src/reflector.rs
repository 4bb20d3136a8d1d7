use crate::codegen::TemplateRenderer;
use crate::document::{Document, ShaderStage};
use crate::ir::ReflectionSource;
use crate::layout::reflect_struct_definition;
use crate::naming::{NameAllocator, NameResolver};
use crate::resources::reflect_resources;
use crate::vertex_input::reflect_per_vertex_struct_definition;
use crate::{ReflectorError, ReflectorResult};
use fnv::FnvHashSet;

#[derive(Clone, Debug, Default)]
pub struct ReflectorOptions {
    pub shader_name: String,
    pub header_file_name: String,
}

/// Runs a single reflection pass over a shader module. `names` is shared with any other pass that
/// runs in this process so that synthesized names stay unique across all of them.
pub fn generate_document(
    options: &ReflectorOptions,
    source: &dyn ReflectionSource,
    names: &NameAllocator,
) -> ReflectorResult<Document> {
    let entry_points = source.entry_points();
    if entry_points.len() != 1 {
        let error = ReflectorError::IncorrectEntryPointCount(entry_points.len());
        log::error!("{}: {}", options.shader_name, error);
        return Err(error);
    }

    let entry_point = &entry_points[0];
    let shader_stage = ShaderStage::from_execution_model(entry_point.execution_model);
    log::trace!(
        "{}: reflecting {} entry point {}",
        options.shader_name,
        shader_stage.as_str(),
        entry_point.name
    );

    let shader_resources = source.shader_resources();

    // Resources without a debug name are named once here so that everything generated from the
    // document agrees on the name
    let resolver = NameResolver::new(source, names);
    let stage_input_handles = resolver.named_resources(&shader_resources.stage_inputs);

    log::trace!("{}: reflect uniform buffers", options.shader_name);
    let uniform_buffers = reflect_resources(
        source,
        &resolver.named_resources(&shader_resources.uniform_buffers),
    )?;

    log::trace!("{}: reflect stage inputs", options.shader_name);
    let stage_inputs = reflect_resources(source, &stage_input_handles)?;

    log::trace!("{}: reflect images and samplers", options.shader_name);
    let mut sampled_images = Vec::default();
    for resources in &[
        &shader_resources.sampled_images,
        &shader_resources.separate_images,
        &shader_resources.separate_samplers,
    ] {
        sampled_images.extend(reflect_resources(
            source,
            &resolver.named_resources(resources),
        )?);
    }

    log::trace!("{}: reflect stage outputs", options.shader_name);
    let stage_outputs = reflect_resources(
        source,
        &resolver.named_resources(&shader_resources.stage_outputs),
    )?;

    let mut struct_definitions = Vec::default();

    if shader_stage == ShaderStage::Vertex {
        match reflect_per_vertex_struct_definition(source, &resolver, &stage_input_handles) {
            Ok(per_vertex) => struct_definitions.push(per_vertex),
            Err(decline) => log::debug!(
                "{}: not generating a per-vertex struct, {}",
                options.shader_name,
                decline
            ),
        }
    }

    // Variations of a type (pointers, arrays) appear in the table alongside it, only reflect each
    // struct once
    let mut known_structs = FnvHashSet::default();
    for type_id in source.type_ids() {
        let identity = source.get_type(type_id)?.identity();
        if !known_structs.insert(identity) {
            continue;
        }

        if let Some(s) = reflect_struct_definition(source, &resolver, identity)? {
            struct_definitions.push(s);
        }
    }

    Ok(Document {
        entrypoint: entry_point.name.clone(),
        shader_name: options.shader_name.clone(),
        shader_stage,
        header_file_name: options.header_file_name.clone(),
        uniform_buffers,
        stage_inputs,
        sampled_images,
        stage_outputs,
        struct_definitions,
    })
}

/// The result of a successful reflection pass along with everything rendered from it. If any step
/// fails no reflector is produced, so there is never a partial header or source.
pub struct Reflector {
    document: Document,
    reflection_json: String,
    reflection_header: String,
    reflection_source: String,
}

impl Reflector {
    pub fn new(
        options: &ReflectorOptions,
        source: &dyn ReflectionSource,
        names: &NameAllocator,
        renderer: &dyn TemplateRenderer,
    ) -> ReflectorResult<Self> {
        let document = generate_document(options, source, names)?;

        log::trace!("{}: render reflection data", options.shader_name);
        let reflection_json = document.to_json()?;
        let reflection_header = renderer.render_header(&document)?;
        let reflection_source = renderer.render_source(&document)?;

        Ok(Reflector {
            document,
            reflection_json,
            reflection_header,
            reflection_source,
        })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn reflection_json(&self) -> &str {
        &self.reflection_json
    }

    pub fn reflection_header(&self) -> &str {
        &self.reflection_header
    }

    pub fn reflection_source(&self) -> &str {
        &self.reflection_source
    }
}
