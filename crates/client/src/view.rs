//! Terminal rendering of products.

use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};

use stockroom_products::Product;

pub const EMPTY_MESSAGE: &str = "No products found.";

/// A table column bound to a typed accessor.
pub struct Column {
    pub header: &'static str,
    pub value: fn(&Product) -> String,
}

pub const PRODUCT_COLUMNS: [Column; 5] = [
    Column {
        header: "ID",
        value: id_cell,
    },
    Column {
        header: "Name",
        value: name_cell,
    },
    Column {
        header: "Description",
        value: description_cell,
    },
    Column {
        header: "Price",
        value: price_cell,
    },
    Column {
        header: "Stock",
        value: stock_cell,
    },
];

fn id_cell(p: &Product) -> String {
    p.id.to_string()
}

fn name_cell(p: &Product) -> String {
    p.name.clone()
}

fn description_cell(p: &Product) -> String {
    p.description.clone().unwrap_or_default()
}

fn price_cell(p: &Product) -> String {
    format_price(p.price)
}

fn stock_cell(p: &Product) -> String {
    p.stock.to_string()
}

pub fn format_price(price: f64) -> String {
    format!("{price:.2}")
}

pub fn render_products(products: &[Product]) -> String {
    if products.is_empty() {
        return EMPTY_MESSAGE.to_string();
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(PRODUCT_COLUMNS.iter().map(|c| c.header));

    for product in products {
        table.add_row(PRODUCT_COLUMNS.iter().map(|c| (c.value)(product)));
    }

    table.to_string()
}

/// One record as `Header: value` lines.
pub fn render_product(product: &Product) -> String {
    PRODUCT_COLUMNS
        .iter()
        .map(|c| format!("{}: {}", c.header, (c.value)(product)))
        .collect::<Vec<_>>()
        .join("\n")
}
