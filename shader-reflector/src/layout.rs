use crate::classify::{classify_struct_member, Classification, HostType};
use crate::document::{StructDefinition, StructMember};
use crate::ir::{ReflectionSource, TypeId};
use crate::naming::{NameResolver, PADDING_SUFFIX};
use crate::ReflectorResult;

/// Structs whose name contains this were generated by the compiler and are never emitted
pub const RESERVED_IDENTIFIER_MARKER: &str = "_RESERVED_IDENTIFIER_";

/// Appends members back to back. No alignment is ever inserted, any padding is an explicit member.
#[derive(Default)]
pub(crate) struct LayoutAccumulator {
    members: Vec<StructMember>,
    byte_length: usize,
}

impl LayoutAccumulator {
    pub(crate) fn push(
        &mut self,
        name: String,
        host_type: HostType,
    ) {
        let byte_length = host_type.byte_size();
        log::trace!(
            "    {}: {} at +{} (size: {})",
            name,
            host_type.type_name(),
            self.byte_length,
            byte_length
        );
        self.members.push(StructMember {
            name,
            type_name: host_type.type_name(),
            offset: self.byte_length,
            byte_length,
        });
        self.byte_length += byte_length;
    }

    pub(crate) fn push_classified(
        &mut self,
        name: String,
        classification: Classification,
    ) {
        match classification {
            Classification::Known {
                host_type,
                trailing_padding,
            } => {
                if trailing_padding != 0 {
                    let padding_name = format!("{}{}", name, PADDING_SUFFIX);
                    self.push(name, host_type);
                    self.push(padding_name, HostType::Padding(trailing_padding));
                } else {
                    self.push(name, host_type);
                }
            }
            Classification::Opaque { byte_length } => {
                self.push(name, HostType::Padding(byte_length));
            }
        }
    }

    pub(crate) fn finish(
        self,
        name: String,
    ) -> StructDefinition {
        StructDefinition {
            name,
            byte_length: self.byte_length,
            members: self.members,
        }
    }
}

/// Lays out the members of a struct type in declaration order. Members that can't be expressed on
/// the host become padding of the same size rather than failing the struct.
pub fn read_struct_members(
    source: &dyn ReflectionSource,
    resolver: &NameResolver,
    struct_type_id: TypeId,
) -> ReflectorResult<Vec<StructMember>> {
    let struct_type = source.get_type(struct_type_id)?;
    if !struct_type.is_struct() {
        Err(format!(
            "Type {} has base type {:?}, expected a struct",
            struct_type_id, struct_type.descriptor.base_type
        ))?;
    }

    let mut layout = LayoutAccumulator::default();
    for (index, &member_type_id) in struct_type.member_types.iter().enumerate() {
        let member_type = source.get_type(member_type_id)?;
        let name = resolver.member_name(struct_type, index)?;
        layout.push_classified(name, classify_struct_member(&member_type.descriptor)?);
    }

    Ok(layout.members)
}

/// Returns `None` for anything that isn't a struct and for compiler-internal structs
pub fn reflect_struct_definition(
    source: &dyn ReflectionSource,
    resolver: &NameResolver,
    type_id: TypeId,
) -> ReflectorResult<Option<StructDefinition>> {
    let ty = source.get_type(type_id)?;
    if !ty.is_struct() {
        return Ok(None);
    }

    let struct_name = resolver.struct_name(ty);
    if struct_name.contains(RESERVED_IDENTIFIER_MARKER) {
        log::trace!("Skipping reserved struct {}", struct_name);
        return Ok(None);
    }

    log::trace!("Reflecting struct {}", struct_name);
    let members = read_struct_members(source, resolver, type_id)?;
    let byte_length = members.iter().map(|x| x.byte_length).sum();
    Ok(Some(StructDefinition {
        name: struct_name,
        byte_length,
        members,
    }))
}
