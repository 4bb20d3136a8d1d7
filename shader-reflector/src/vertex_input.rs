use crate::classify::classify_vertex_input;
use crate::document::StructDefinition;
use crate::ir::{Decoration, ReflectionSource, Resource, TypeId};
use crate::layout::LayoutAccumulator;
use crate::naming::NameResolver;
use std::collections::BTreeMap;

pub const PER_VERTEX_STRUCT_NAME: &str = "PerVertexData";

/// Why no per-vertex struct was produced. None of these fail the reflection pass.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PerVertexDecline {
    /// Consumers assume the per-vertex struct is never zero sized
    NoInputs,
    DuplicateLocation(u32),
    /// Locations must be exactly 0..N for N inputs
    NonContiguousLocations,
    UnknownInputType(TypeId),
    /// The input's declared size overflows
    OversizedInputType(TypeId),
}

impl core::fmt::Display for PerVertexDecline {
    fn fmt(
        &self,
        fmt: &mut core::fmt::Formatter,
    ) -> core::fmt::Result {
        match *self {
            PerVertexDecline::NoInputs => write!(fmt, "the stage has no inputs"),
            PerVertexDecline::DuplicateLocation(location) => {
                write!(fmt, "location {} is used by more than one input", location)
            }
            PerVertexDecline::NonContiguousLocations => {
                write!(fmt, "input locations are not contiguous from 0")
            }
            PerVertexDecline::UnknownInputType(type_id) => {
                write!(fmt, "input type {} is not in the type table", type_id)
            }
            PerVertexDecline::OversizedInputType(type_id) => {
                write!(fmt, "input type {} has a declared size that overflows", type_id)
            }
        }
    }
}

/// Packs the vertex stage inputs, ordered by location, into a single struct that can be used as
/// the layout of a vertex buffer
pub fn reflect_per_vertex_struct_definition(
    source: &dyn ReflectionSource,
    resolver: &NameResolver,
    stage_inputs: &[Resource],
) -> Result<StructDefinition, PerVertexDecline> {
    if stage_inputs.is_empty() {
        return Err(PerVertexDecline::NoInputs);
    }

    let mut inputs_by_location = BTreeMap::<u32, &Resource>::default();
    for input in stage_inputs {
        let location = source.get_decoration(input.id, Decoration::Location);
        if inputs_by_location.insert(location, input).is_some() {
            return Err(PerVertexDecline::DuplicateLocation(location));
        }
    }

    let contiguous = inputs_by_location
        .keys()
        .enumerate()
        .all(|(expected, &location)| location as usize == expected);
    if !contiguous {
        return Err(PerVertexDecline::NonContiguousLocations);
    }

    let mut layout = LayoutAccumulator::default();
    for input in inputs_by_location.values() {
        let ty = source
            .get_type(input.type_id)
            .map_err(|_| PerVertexDecline::UnknownInputType(input.type_id))?;
        let name = if input.name.is_empty() {
            resolver.allocate("")
        } else {
            input.name.clone()
        };
        let classification = classify_vertex_input(&ty.descriptor)
            .map_err(|_| PerVertexDecline::OversizedInputType(input.type_id))?;
        layout.push_classified(name, classification);
    }

    Ok(layout.finish(PER_VERTEX_STRUCT_NAME.to_string()))
}
