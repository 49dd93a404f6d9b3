//! Authority registry for descriptor storage and lookup.
//!
//! The [`RegistryBuilder`] collects validated descriptors together with the
//! factories that build their adapters; [`RegistryBuilder::build`] freezes
//! them into an [`AuthorityRegistry`]. The frozen registry has no mutating
//! API, so it can be shared across concurrent requests without locking and
//! nothing can be registered after the first lookup.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::adapter::AdapterFactory;
use crate::capability::Operation;
use crate::descriptor::AuthorityDescriptor;
use crate::error::AuthorityError;

/// Namespace prefixed to authority names in diagnostics.
pub const DEFAULT_NAMESPACE: &str = "Qa::Authorities";

/// A descriptor paired with the factory that builds its adapters.
#[derive(Clone)]
pub struct RegisteredAuthority {
    descriptor: AuthorityDescriptor,
    factory: Arc<dyn AdapterFactory>,
}

impl RegisteredAuthority {
    /// Returns the authority's descriptor.
    #[must_use]
    pub const fn descriptor(&self) -> &AuthorityDescriptor {
        &self.descriptor
    }

    /// Returns the adapter factory.
    #[must_use]
    pub fn factory(&self) -> &dyn AdapterFactory {
        self.factory.as_ref()
    }
}

impl fmt::Debug for RegisteredAuthority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredAuthority")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// Collects authority registrations before the registry is frozen.
///
/// # Example
///
/// ```
/// use qa_authority::adapter::{AuthorityAdapter, adapter_factory};
/// use qa_authority::capability::OperationSet;
/// use qa_authority::descriptor::AuthorityDescriptor;
/// use qa_authority::registry::AuthorityRegistry;
///
/// struct Empty;
/// impl AuthorityAdapter for Empty {}
///
/// let mut builder = AuthorityRegistry::builder();
/// builder
///     .register(
///         AuthorityDescriptor::new("mesh", OperationSet::all()),
///         adapter_factory(|_| Ok(Box::new(Empty))),
///     )
///     .expect("registration succeeds");
/// let registry = builder.build();
/// assert!(registry.lookup("mesh").is_some());
/// assert!(registry.lookup("MESH").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct RegistryBuilder {
    namespace: String,
    authorities: BTreeMap<String, RegisteredAuthority>,
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self {
            namespace: String::from(DEFAULT_NAMESPACE),
            authorities: BTreeMap::new(),
        }
    }
}

impl RegistryBuilder {
    /// Sets the namespace used when qualifying names in diagnostics.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Registers an authority after validating its descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorityError::Descriptor`] if validation fails, or
    /// [`AuthorityError::Duplicate`] if the identifier is already taken.
    pub fn register<F>(
        &mut self,
        descriptor: AuthorityDescriptor,
        factory: F,
    ) -> Result<&mut Self, AuthorityError>
    where
        F: AdapterFactory + 'static,
    {
        descriptor.validate()?;
        let identifier = descriptor.identifier().to_owned();
        if self.authorities.contains_key(&identifier) {
            return Err(AuthorityError::Duplicate { identifier });
        }
        self.authorities.insert(
            identifier,
            RegisteredAuthority {
                descriptor,
                factory: Arc::new(factory),
            },
        );
        Ok(self)
    }

    /// Freezes the registrations into a read-only registry.
    #[must_use]
    pub fn build(self) -> AuthorityRegistry {
        AuthorityRegistry {
            namespace: self.namespace,
            authorities: self.authorities,
        }
    }
}

/// Read-only mapping from vocabulary identifier to authority.
#[derive(Debug, Clone)]
pub struct AuthorityRegistry {
    namespace: String,
    authorities: BTreeMap<String, RegisteredAuthority>,
}

impl AuthorityRegistry {
    /// Starts a new registry with the default namespace.
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Looks up an authority by its exact, case-sensitive identifier.
    #[must_use]
    pub fn lookup(&self, identifier: &str) -> Option<&RegisteredAuthority> {
        self.authorities.get(identifier)
    }

    /// Returns the fully qualified name for `identifier`.
    ///
    /// Registered authorities may override the name through their
    /// descriptor; otherwise the identifier is capitalised (first character
    /// upper case, the rest lower case). Unknown identifiers are qualified
    /// the same way so diagnostics can name them.
    #[must_use]
    pub fn qualified_name(&self, identifier: &str) -> String {
        let name = self
            .lookup(identifier)
            .and_then(|authority| authority.descriptor().qualified_name())
            .map_or_else(|| capitalize(identifier), str::to_owned);
        format!("{}::{name}", self.namespace)
    }

    /// Returns the namespace used in diagnostics.
    #[must_use]
    pub const fn namespace(&self) -> &str {
        self.namespace.as_str()
    }

    /// Returns the registered identifiers in sorted order.
    #[must_use]
    pub fn identifiers(&self) -> Vec<&str> {
        self.authorities.keys().map(String::as_str).collect()
    }

    /// Returns every authority declaring `operation`, in identifier order.
    #[must_use]
    pub fn find_for_operation(&self, operation: Operation) -> Vec<&AuthorityDescriptor> {
        self.authorities
            .values()
            .map(RegisteredAuthority::descriptor)
            .filter(|descriptor| descriptor.supports(operation))
            .collect()
    }

    /// Returns the number of registered authorities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.authorities.len()
    }

    /// Returns `true` when no authorities are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.authorities.is_empty()
    }
}

fn capitalize(identifier: &str) -> String {
    let mut chars = identifier.chars();
    chars.next().map_or_else(String::new, |first| {
        first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect()
    })
}
