mod api;
mod helpers;
mod ipn;
mod mocks;
