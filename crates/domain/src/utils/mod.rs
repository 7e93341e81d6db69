//! Pure helpers shared by the client

pub mod mobiledoc;
