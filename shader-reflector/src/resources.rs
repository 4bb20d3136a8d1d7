use crate::document::{MslResourceBindings, ShaderResource};
use crate::ir::{Decoration, MslResourceSlot, ReflectionSource, Resource};
use crate::ReflectorResult;

pub fn reflect_resource(
    source: &dyn ReflectionSource,
    resource: &Resource,
) -> ReflectorResult<ShaderResource> {
    let reflected_type = source.get_type(resource.type_id)?.descriptor;

    let mut msl_slots = [0; 4];
    for slot in MslResourceSlot::ALL.iter() {
        msl_slots[slot.index()] = source.get_automatic_msl_resource_binding(resource.id, *slot);
    }

    Ok(ShaderResource {
        name: resource.name.clone(),
        descriptor_set: source.get_decoration(resource.id, Decoration::DescriptorSet),
        binding: source.get_decoration(resource.id, Decoration::Binding),
        location: source.get_decoration(resource.id, Decoration::Location),
        index: source.get_decoration(resource.id, Decoration::Index),
        msl_resource_bindings: MslResourceBindings::from(msl_slots),
        reflected_type,
    })
}

/// A partial list of resources is meaningless to consumers, so a single resource that can't be
/// reflected fails the whole list
pub fn reflect_resources(
    source: &dyn ReflectionSource,
    resources: &[Resource],
) -> ReflectorResult<Vec<ShaderResource>> {
    resources
        .iter()
        .map(|resource| {
            reflect_resource(source, resource).map_err(|e| {
                log::error!("Could not reflect resource {}: {}", resource.name, e);
                e
            })
        })
        .collect()
}
