// crates/locator-core/src/traits.rs
use crate::index::{City, Country, LocationRef};
use crate::model::{Server, ServerId};
use crate::text::fold_key;
use std::sync::Arc;

/// Name-based matching helpers for types that expose a canonical display name.
///
/// Implementors provide a `&str` view of their canonical name via
/// [`NameMatch::name_str`], and get an accent- and case-insensitive
/// equality check built on [`fold_key`].
///
/// # Examples
/// ```rust
/// use locator_core::traits::NameMatch;
///
/// struct Place(&'static str);
/// impl NameMatch for Place {
///     fn name_str(&self) -> &str { self.0 }
/// }
///
/// assert!(Place("Zürich").is_named("zurich"));
/// assert!(!Place("Zürich").is_named("zug"));
/// ```
pub trait NameMatch {
    /// Returns the canonical display name used for matching.
    fn name_str(&self) -> &str;

    #[inline]
    fn is_named(&self, q: &str) -> bool {
        fold_key(self.name_str()) == fold_key(q)
    }
}

/// Iterator over the servers backing a search candidate.
pub type ServersIter<'a> = Box<dyn Iterator<Item = &'a Server> + 'a>;

/// A country, city or server that can appear in search results.
///
/// The status overlay only needs the servers behind a candidate and a way to
/// tell whether the active connection lands on it.
pub trait Candidate: NameMatch {
    /// Servers that make up this candidate (a server yields itself).
    fn servers(&self) -> ServersIter<'_>;

    /// True when `location` (a resolved active server) falls within this candidate.
    fn contains(&self, location: &LocationRef) -> bool;

    /// Identity used for partnership lookups; only servers have one.
    fn partner_key(&self) -> Option<&ServerId> {
        None
    }
}

impl NameMatch for Country {
    #[inline]
    fn name_str(&self) -> &str {
        &self.name
    }
}

impl NameMatch for City {
    #[inline]
    fn name_str(&self) -> &str {
        &self.name
    }
}

impl NameMatch for Server {
    #[inline]
    fn name_str(&self) -> &str {
        &self.server_name
    }
}

impl Candidate for Country {
    fn servers(&self) -> ServersIter<'_> {
        Box::new(self.servers.iter().map(Arc::as_ref))
    }

    fn contains(&self, location: &LocationRef) -> bool {
        location.country_code == self.code
    }
}

impl Candidate for City {
    fn servers(&self) -> ServersIter<'_> {
        Box::new(self.servers.iter().map(Arc::as_ref))
    }

    fn contains(&self, location: &LocationRef) -> bool {
        location.city.as_ref() == Some(&self.key())
    }
}

impl Candidate for Server {
    fn servers(&self) -> ServersIter<'_> {
        Box::new(std::iter::once(self))
    }

    fn contains(&self, location: &LocationRef) -> bool {
        location.server_id == self.server_id
    }

    fn partner_key(&self) -> Option<&ServerId> {
        Some(&self.server_id)
    }
}

impl<T: NameMatch + ?Sized> NameMatch for Arc<T> {
    #[inline]
    fn name_str(&self) -> &str {
        self.as_ref().name_str()
    }
}

impl<T: Candidate + ?Sized> Candidate for Arc<T> {
    fn servers(&self) -> ServersIter<'_> {
        self.as_ref().servers()
    }

    fn contains(&self, location: &LocationRef) -> bool {
        self.as_ref().contains(location)
    }

    fn partner_key(&self) -> Option<&ServerId> {
        self.as_ref().partner_key()
    }
}
