use crate::store::Store;
use crate::upstream::MovieCatalog;

///
/// Context for Juniper
///
/// Owns the in-memory store and the movie catalog client for the life of the
/// process. Resolvers borrow it per field resolution.
///
pub struct Context {
    pub store: Store,
    pub movies: MovieCatalog,
}

impl juniper::Context for Context {}

impl Context {
    pub fn new(store: Store, movies: MovieCatalog) -> Self {
        Self { store, movies }
    }

    /// Context over the fixed demo seed.
    pub fn seeded(movies: MovieCatalog) -> Self {
        Self::new(Store::seeded(), movies)
    }
}
