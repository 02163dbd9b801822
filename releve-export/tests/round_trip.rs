//! Fragment stream through the full pipeline and out as HomeBank CSV.

use releve_core::{StatementPipeline, TextFragment};
use releve_export::homebank;

fn frag(text: &str, x: f64, y: f64) -> TextFragment {
    TextFragment {
        text: text.to_string(),
        x,
        y,
    }
}

#[test]
fn test_known_statement_renders_expected_rows() {
    let fragments = vec![
        frag("Ancien solde au 31 décembre 2023", 52.8, 740.0),
        frag("15/03", 52.8, 700.0),
        frag("VIREMENT SALAIRE ", 120.0, 700.0),
        frag("1 234,56", 450.0, 700.0),
        frag("20/03", 53.76, 680.0),
        frag("RETRAIT DAB ", 120.0, 680.0),
        frag("50,00", 470.0, 680.0),
    ];

    let pipeline = StatementPipeline::new().unwrap();
    let txns = pipeline.extract(&fragments).unwrap();
    let csv = homebank::to_csv(&txns).unwrap();

    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "date;paymode;info;payee;memo;amount;category;tags");
    assert_eq!(lines[1], "03/15/2023;4;;;VIREMENT SALAIRE;-1234.56;;");
    assert_eq!(lines[2], "03/20/2023;3;;;RETRAIT DAB;-50;;");
}
