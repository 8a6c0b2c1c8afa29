// ABOUTME: Phantom-typed resource references for compile-time type safety.
// ABOUTME: Prevents accidental swapping of load balancer, listener, target group and service refs.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Marker types for phantom type parameters.
/// Using empty enums prevents instantiation and requires no trait bounds.
pub enum LoadBalancerMarker {}
pub enum ListenerMarker {}
pub enum TargetGroupMarker {}
pub enum ServiceMarker {}

/// A reference to a provisioned resource: either a literal ARN or the
/// logical identifier the manifest uses before the ARN exists.
///
/// Using phantom types, this ensures a `ListenerRef` can't be passed where a
/// `TargetGroupRef` is expected, catching bugs at compile time.
#[must_use = "references identify resources and should not be ignored"]
pub struct ResourceRef<T> {
    value: String,
    _marker: PhantomData<T>,
}

impl<T> ResourceRef<T> {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            _marker: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Whether this is a literal ARN (`arn:<partition>:<service>:...`).
    pub fn is_arn(&self) -> bool {
        self.value.starts_with("arn:") && self.value.splitn(6, ':').count() == 6
    }
}

// Manual trait implementations that don't require T to implement the trait.

impl<T> std::fmt::Debug for ResourceRef<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceRef")
            .field("value", &self.value)
            .finish()
    }
}

impl<T> Clone for ResourceRef<T> {
    fn clone(&self) -> Self {
        Self::new(self.value.clone())
    }
}

impl<T> PartialEq for ResourceRef<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for ResourceRef<T> {}

impl<T> Hash for ResourceRef<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> std::fmt::Display for ResourceRef<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> Serialize for ResourceRef<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for ResourceRef<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        if value.trim().is_empty() {
            return Err(serde::de::Error::custom("resource reference cannot be empty"));
        }
        Ok(Self::new(value))
    }
}

pub type LoadBalancerRef = ResourceRef<LoadBalancerMarker>;
pub type ListenerRef = ResourceRef<ListenerMarker>;
pub type TargetGroupRef = ResourceRef<TargetGroupMarker>;
pub type ServiceRef = ResourceRef<ServiceMarker>;
