use views::Catalog;

pub(crate) struct AppState {
    pub(crate) catalog: Catalog,
}
