use super::ui;
use crate::core::format::format_currency;
use crate::core::CurrencyCode;
use comfy_table::{Cell, Table};

/// Table of every supported currency.
pub fn currency_table() -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Código"),
        ui::header_cell("Moeda"),
        ui::header_cell("Exemplo"),
    ]);

    for currency in CurrencyCode::ALL {
        table.add_row(vec![
            Cell::new(currency.code()),
            Cell::new(currency.display_name()),
            Cell::new(format_currency(1234.5, currency)),
        ]);
    }
    table
}

pub fn run() {
    println!("{}", currency_table());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_lists_every_currency() {
        let table = currency_table();
        assert_eq!(table.row_iter().count(), CurrencyCode::ALL.len());

        let rendered = table.to_string();
        assert!(rendered.contains("BRL"));
        assert!(rendered.contains("Real Brasileiro"));
        assert!(rendered.contains("Peso Argentino"));
        assert!(rendered.contains("JP¥ 1.234"));
    }
}
