#![cfg(test)]

use crate::ir::*;

/// Builds `ShaderModuleIr` fixtures the way a frontend would fill them in. Ids are handed out
/// sequentially starting at 1 and are shared between types and variables.
#[derive(Default)]
pub(crate) struct IrBuilder {
    ir: ShaderModuleIr,
    last_id: Id,
}

impl IrBuilder {
    fn next_id(&mut self) -> Id {
        self.last_id += 1;
        self.last_id
    }

    fn get_type_mut(
        &mut self,
        type_id: TypeId,
    ) -> &mut ParsedType {
        self.ir.types.get_mut(type_id).unwrap()
    }

    pub(crate) fn add_type(
        &mut self,
        descriptor: TypeDescriptor,
    ) -> TypeId {
        let id = self.next_id();
        self.ir.types.push(ParsedType {
            id,
            derived_from: None,
            descriptor,
            member_types: vec![],
            type_alias: None,
        });
        id
    }

    pub(crate) fn add_struct(
        &mut self,
        name: &str,
        members: &[(&str, TypeId)],
    ) -> TypeId {
        let id = self.add_type(TypeDescriptor::new(BaseType::Struct, 0, 1, 1));
        self.get_type_mut(id).member_types = members.iter().map(|x| x.1).collect();
        if !name.is_empty() {
            self.ir.names.insert(id, name.to_string());
        }
        self.ir
            .member_names
            .insert(id, members.iter().map(|x| x.0.to_string()).collect());
        id
    }

    /// A distinct struct declaration whose member metadata lives on `canonical`
    pub(crate) fn add_alias(
        &mut self,
        canonical: TypeId,
    ) -> TypeId {
        let id = self.next_id();
        let mut alias = self.get_type_mut(canonical).clone();
        alias.id = id;
        alias.derived_from = None;
        alias.type_alias = Some(canonical);
        self.ir.types.push(alias);
        id
    }

    pub(crate) fn set_alias(
        &mut self,
        type_id: TypeId,
        alias: TypeId,
    ) {
        self.get_type_mut(type_id).type_alias = Some(alias);
    }

    /// A pointer-like variation that shares the identity of `base`
    pub(crate) fn add_variation(
        &mut self,
        base: TypeId,
    ) -> TypeId {
        let id = self.next_id();
        let mut variation = self.get_type_mut(base).clone();
        variation.id = id;
        variation.derived_from = Some(variation.derived_from.unwrap_or(base));
        self.ir.types.push(variation);
        id
    }

    pub(crate) fn add_entry_point(
        &mut self,
        name: &str,
        execution_model: ExecutionModel,
    ) {
        self.ir.entry_points.push(EntryPoint {
            name: name.to_string(),
            execution_model,
        });
    }

    fn add_resource(
        &mut self,
        name: &str,
        type_id: TypeId,
        decorations: ResourceDecorations,
    ) -> Resource {
        let id = self.next_id();
        self.ir.decorations.insert(id, decorations);
        if !name.is_empty() {
            self.ir.names.insert(id, name.to_string());
        }
        Resource {
            id,
            type_id,
            base_type_id: type_id,
            name: name.to_string(),
        }
    }

    pub(crate) fn add_stage_input(
        &mut self,
        name: &str,
        type_id: TypeId,
        location: u32,
    ) -> Id {
        let resource = self.add_resource(
            name,
            type_id,
            ResourceDecorations {
                location,
                ..Default::default()
            },
        );
        let id = resource.id;
        self.ir.resources.stage_inputs.push(resource);
        id
    }

    pub(crate) fn add_stage_output(
        &mut self,
        name: &str,
        type_id: TypeId,
        location: u32,
    ) -> Id {
        let resource = self.add_resource(
            name,
            type_id,
            ResourceDecorations {
                location,
                ..Default::default()
            },
        );
        let id = resource.id;
        self.ir.resources.stage_outputs.push(resource);
        id
    }

    fn binding_decorations(
        set: u32,
        binding: u32,
    ) -> ResourceDecorations {
        ResourceDecorations {
            descriptor_set: set,
            binding,
            msl_resource_bindings: [binding, binding + 100, binding + 200, binding + 300],
            ..Default::default()
        }
    }

    pub(crate) fn add_uniform_buffer(
        &mut self,
        name: &str,
        type_id: TypeId,
        set: u32,
        binding: u32,
    ) -> Id {
        let resource = self.add_resource(name, type_id, Self::binding_decorations(set, binding));
        let id = resource.id;
        self.ir.resources.uniform_buffers.push(resource);
        id
    }

    pub(crate) fn add_sampled_image(
        &mut self,
        name: &str,
        type_id: TypeId,
        set: u32,
        binding: u32,
    ) -> Id {
        let resource = self.add_resource(name, type_id, Self::binding_decorations(set, binding));
        let id = resource.id;
        self.ir.resources.sampled_images.push(resource);
        id
    }

    pub(crate) fn add_separate_image(
        &mut self,
        name: &str,
        type_id: TypeId,
        set: u32,
        binding: u32,
    ) -> Id {
        let resource = self.add_resource(name, type_id, Self::binding_decorations(set, binding));
        let id = resource.id;
        self.ir.resources.separate_images.push(resource);
        id
    }

    pub(crate) fn add_separate_sampler(
        &mut self,
        name: &str,
        type_id: TypeId,
        set: u32,
        binding: u32,
    ) -> Id {
        let resource = self.add_resource(name, type_id, Self::binding_decorations(set, binding));
        let id = resource.id;
        self.ir.resources.separate_samplers.push(resource);
        id
    }

    pub(crate) fn build(self) -> ShaderModuleIr {
        self.ir
    }
}

pub(crate) fn vec2() -> TypeDescriptor {
    TypeDescriptor::new(BaseType::Float, 32, 2, 1)
}

pub(crate) fn vec3() -> TypeDescriptor {
    TypeDescriptor::new(BaseType::Float, 32, 3, 1)
}

pub(crate) fn vec4() -> TypeDescriptor {
    TypeDescriptor::new(BaseType::Float, 32, 4, 1)
}

pub(crate) fn mat4() -> TypeDescriptor {
    TypeDescriptor::new(BaseType::Float, 32, 4, 4)
}
