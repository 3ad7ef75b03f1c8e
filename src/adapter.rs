//! Resource adapter contract.
//!
//! Every resource kind (database, collection, principal) implements
//! [`ResourceAdapter`] on top of a [`Backend`](crate::backend::Backend). The
//! adapter owns everything kind-specific: which native calls to make, which
//! options are required, and which native key carries the resource name.
//! The generic [`ResourceService`](crate::service::ResourceService) composes
//! adapter calls and never looks inside a descriptor beyond `name`.

use crate::error::ServiceResult;
use crate::query::Descriptor;
use std::future::Future;

/// Field carrying the resource identity in normalized descriptors.
pub const NAME_FIELD: &str = "name";

/// Adapter-specific reference to one live backend resource.
///
/// Handles live for a single service call and are only used to request a
/// descriptor or a removal.
pub trait ResourceHandle: Send + Sync {
    /// Native identifier of the resource.
    fn name(&self) -> &str;

    /// The handle's own raw descriptor, when no statistics call is needed.
    ///
    /// Handles returning `None` are described through
    /// [`ResourceAdapter::describe`].
    fn as_descriptor(&self) -> Option<Descriptor> {
        None
    }
}

/// Capability contract implemented once per resource kind.
pub trait ResourceAdapter: Send + Sync {
    type Handle: ResourceHandle;

    /// Human-readable resource kind, used in errors and logs.
    fn kind(&self) -> &'static str;

    /// Create one resource and return its raw descriptor.
    ///
    /// `options` never contains the `name` field.
    ///
    /// # Errors
    ///
    /// A validation error when required native options are missing.
    fn create_one(
        &self,
        name: &str,
        options: Descriptor,
    ) -> impl Future<Output = ServiceResult<Descriptor>> + Send;

    /// Resolve a handle by name; `None` means the resource does not exist.
    fn get_one(
        &self,
        name: &str,
    ) -> impl Future<Output = ServiceResult<Option<Self::Handle>>> + Send;

    /// Handles for every resource of this kind, in native listing order.
    fn list_all(&self) -> impl Future<Output = ServiceResult<Vec<Self::Handle>>> + Send;

    /// Fetch the raw descriptor (statistics) of a handle.
    fn describe(
        &self,
        handle: &Self::Handle,
    ) -> impl Future<Output = ServiceResult<Descriptor>> + Send;

    /// Remove the resource at the backend. Irreversible.
    fn remove_one(&self, handle: Self::Handle) -> impl Future<Output = ServiceResult<()>> + Send;

    /// Rename the native identity field to `name`.
    fn normalize(&self, raw: Descriptor) -> Descriptor;
}

/// Move the value of `identity_key` to a leading `name` field.
///
/// The identity key is removed. A descriptor without the identity key is
/// returned unchanged, which makes the operation idempotent.
pub fn rename_identity(raw: Descriptor, identity_key: &str) -> Descriptor {
    let Some(identity) = raw.get(identity_key).cloned() else {
        return raw;
    };
    with_name(raw, identity_key, identity)
}

/// Build a descriptor whose first field is `name`, dropping `identity_key`.
pub(crate) fn with_name(
    raw: Descriptor,
    identity_key: &str,
    name: serde_json::Value,
) -> Descriptor {
    let mut normalized = Descriptor::new();
    normalized.insert(NAME_FIELD.to_string(), name);
    normalized.extend(
        raw.into_iter()
            .filter(|(key, _)| key != identity_key && key != NAME_FIELD),
    );
    normalized
}
