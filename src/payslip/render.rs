//! PDF payslip rendering.
//!
//! Lines run down A4 pages and continue on a new page before they would
//! cross the bottom margin.

use chrono::Month;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use rust_decimal::{Decimal, RoundingStrategy};

use super::PayslipDocument;
use crate::error::{PayrollError, PayrollResult};
use crate::models::ResolvedAdjustment;

const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN_LEFT: i64 = 60;
const AMOUNT_COLUMN: i64 = 400;
const LINE_HEIGHT: i64 = 16;
const TOP_LINE: i64 = PAGE_HEIGHT - 70;
const MARGIN_BOTTOM: i64 = 60;

const REGULAR: &[u8] = b"F1";
const BOLD: &[u8] = b"F2";

/// Formats an amount for display: two decimal places with thousands separators.
///
/// # Examples
///
/// ```
/// use payroll_engine::payslip::format_money;
/// use rust_decimal::Decimal;
///
/// assert_eq!(format_money(Decimal::new(5300000, 2)), "53,000.00");
/// assert_eq!(format_money(Decimal::new(-12345, 1)), "-1,234.50");
/// assert_eq!(format_money(Decimal::new(8333325, 4)), "833.33");
/// ```
pub fn format_money(amount: Decimal) -> String {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    let text = rounded.abs().to_string();
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{}{}.{}", sign, grouped, fraction)
}

fn line_label(line: &ResolvedAdjustment) -> String {
    match line.rate {
        Some(rate) => format!("{} ({}%)", line.label, rate.normalize()),
        None => line.label.clone(),
    }
}

struct PageWriter {
    finished: Vec<Vec<Operation>>,
    operations: Vec<Operation>,
    y: i64,
}

impl PageWriter {
    fn new() -> Self {
        Self {
            finished: Vec::new(),
            operations: Vec::new(),
            y: TOP_LINE,
        }
    }

    fn break_page(&mut self) {
        if !self.operations.is_empty() {
            self.finished.push(std::mem::take(&mut self.operations));
        }
        self.y = TOP_LINE;
    }

    /// Starts a new page unless `lines` more lines fit on this one.
    fn keep_together(&mut self, lines: i64) {
        if self.y - LINE_HEIGHT * lines < MARGIN_BOTTOM {
            self.break_page();
        }
    }

    fn text_at(&mut self, x: i64, font: &[u8], size: i64, text: &str) {
        self.operations.extend([
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![Object::Name(font.to_vec()), Object::Integer(size)],
            ),
            Operation::new("Td", vec![Object::Integer(x), Object::Integer(self.y)]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ]);
    }

    fn advance(&mut self, lines: i64) {
        self.y -= LINE_HEIGHT * lines;
        if self.y < MARGIN_BOTTOM {
            self.break_page();
        }
    }

    fn title(&mut self, text: &str) {
        self.text_at(MARGIN_LEFT, BOLD, 16, text);
        self.advance(1);
    }

    fn line(&mut self, text: &str) {
        self.text_at(MARGIN_LEFT, REGULAR, 10, text);
        self.advance(1);
    }

    fn heading(&mut self, text: &str) {
        self.keep_together(3);
        self.advance(1);
        self.text_at(MARGIN_LEFT, BOLD, 11, text);
        self.advance(1);
        self.rule();
    }

    fn row(&mut self, label: &str, amount: Decimal) {
        self.text_at(MARGIN_LEFT + 10, REGULAR, 10, label);
        self.text_at(AMOUNT_COLUMN, REGULAR, 10, &format_money(amount));
        self.advance(1);
    }

    fn total_row(&mut self, label: &str, amount: Decimal) {
        self.text_at(MARGIN_LEFT + 10, BOLD, 10, label);
        self.text_at(AMOUNT_COLUMN, BOLD, 10, &format_money(amount));
        self.advance(1);
    }

    fn rule(&mut self) {
        let y = self.y + LINE_HEIGHT - 4;
        self.operations.extend([
            Operation::new("w", vec![Object::Real(0.5)]),
            Operation::new("m", vec![Object::Integer(MARGIN_LEFT), Object::Integer(y)]),
            Operation::new(
                "l",
                vec![
                    Object::Integer(PAGE_WIDTH - MARGIN_LEFT),
                    Object::Integer(y),
                ],
            ),
            Operation::new("S", vec![]),
        ]);
    }

    fn into_pages(mut self) -> Vec<Content> {
        self.break_page();
        self.finished
            .into_iter()
            .map(|operations| Content { operations })
            .collect()
    }
}

fn month_title(document: &PayslipDocument) -> String {
    let month = u8::try_from(document.month.month())
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name().to_string())
        .unwrap_or_else(|| document.month.to_string());
    format!("Payslip for {} {}", month, document.month.year())
}

fn layout(document: &PayslipDocument) -> Vec<Content> {
    let breakdown = &document.breakdown;
    let mut page = PageWriter::new();

    page.title(&document.organization.name);
    page.line(&month_title(document));
    page.advance(1);
    page.line(&format!(
        "Employee: {} ({})",
        document.employee.name, document.employee.id
    ));
    if let Some(designation) = &document.employee.designation {
        page.line(&format!("Designation: {}", designation));
    }
    page.line(&format!("Payroll month: {}", document.month));

    page.heading("Earnings");
    page.row("Basic Salary", breakdown.basic_salary);
    for allowance in &breakdown.allowances {
        page.row(&line_label(allowance), allowance.amount);
    }
    page.total_row("Gross Salary", breakdown.gross_salary);

    page.heading("Deductions");
    for deduction in &breakdown.deductions {
        page.row(&line_label(deduction), deduction.amount);
    }
    page.row("PAYE Tax", breakdown.income_tax);
    page.total_row(
        "Total Deductions",
        breakdown.total_deductions + breakdown.income_tax,
    );

    page.heading("Summary");
    page.row("Taxable Income", breakdown.taxable_income);
    page.total_row("Net Pay", breakdown.net_salary);

    if !document.employer_contributions.is_empty() {
        page.heading("Employer Contributions (not deducted)");
        for contribution in &document.employer_contributions {
            let label = match contribution.rate {
                Some(rate) => format!("{} ({}%)", contribution.label, rate.normalize()),
                None => contribution.label.clone(),
            };
            page.row(&label, contribution.amount);
        }
    }

    page.advance(2);
    page.line(&format!(
        "Generated {}",
        document.generated_at.format("%Y-%m-%d %H:%M UTC")
    ));

    page.into_pages()
}

/// Renders a payslip on as many A4 pages as its lines need and returns the PDF bytes.
pub fn render_payslip(document: &PayslipDocument) -> PayrollResult<Vec<u8>> {
    let render_error = |message: String| PayrollError::PayslipRender {
        employee_id: document.employee.id.clone(),
        message,
    };

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular_id,
            "F2" => bold_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for content in layout(document) {
        let encoded = content.encode().map_err(|e| render_error(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }
    let count = i64::try_from(kids.len()).map_err(|e| render_error(e.to_string()))?;
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "Resources" => resources_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(PAGE_WIDTH),
            Object::Integer(PAGE_HEIGHT),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| render_error(e.to_string()))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AdjustmentBasis, AdjustmentSource, AuditTrace, Employee, EmployerContribution,
        Organization, SalaryBreakdown,
    };
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn document() -> PayslipDocument {
        PayslipDocument {
            organization: Organization {
                id: "org_acme".to_string(),
                name: "Acme Foods".to_string(),
            },
            employee: Employee {
                id: "emp_001".to_string(),
                organization_id: "org_acme".to_string(),
                name: "Nimal Perera".to_string(),
                designation: Some("Chef".to_string()),
                basic_salary: dec("50000"),
            },
            month: "01~2026".parse().unwrap(),
            breakdown: SalaryBreakdown {
                basic_salary: dec("50000"),
                allowances: vec![ResolvedAdjustment {
                    label: "COLA".to_string(),
                    basis: AdjustmentBasis::Percentage,
                    rate: Some(dec("10")),
                    amount: dec("5000"),
                    source: AdjustmentSource::General,
                }],
                deductions: vec![ResolvedAdjustment {
                    label: "Meal Consumption".to_string(),
                    basis: AdjustmentBasis::FixedValue,
                    rate: None,
                    amount: dec("2000"),
                    source: AdjustmentSource::MealConsumption,
                }],
                total_allowances: dec("5000"),
                gross_salary: dec("55000"),
                taxable_income: dec("55000"),
                income_tax: dec("0"),
                tax_bands: vec![],
                total_deductions: dec("2000"),
                net_salary: dec("53000"),
                audit_trace: AuditTrace::default(),
            },
            employer_contributions: vec![EmployerContribution {
                label: "ETF".to_string(),
                rate: Some(dec("3")),
                amount: dec("1500"),
            }],
            generated_at: "2026-02-01T08:00:00Z".parse().unwrap(),
        }
    }

    fn page_contents(bytes: &[u8]) -> Vec<Vec<u8>> {
        let doc = Document::load_mem(bytes).unwrap();
        doc.get_pages()
            .values()
            .map(|page_id| doc.get_page_content(*page_id).unwrap())
            .collect()
    }

    fn page_text(bytes: &[u8]) -> String {
        page_contents(bytes)
            .iter()
            .map(|content| String::from_utf8_lossy(content).into_owned())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(dec("0")), "0.00");
        assert_eq!(format_money(dec("999.995")), "1,000.00");
        assert_eq!(format_money(dec("1234567.8")), "1,234,567.80");
        assert_eq!(format_money(dec("-0.001")), "0.00");
        assert_eq!(format_money(dec("-5000")), "-5,000.00");
    }

    #[test]
    fn test_render_produces_single_page_pdf() {
        let bytes = render_payslip(&document()).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
        assert_eq!(page_contents(&bytes).len(), 1);
    }

    #[test]
    fn test_long_payslip_continues_on_new_pages() {
        let mut doc = document();
        doc.breakdown.allowances = (1..=60)
            .map(|i| ResolvedAdjustment {
                label: format!("Allowance {:02}", i),
                basis: AdjustmentBasis::FixedValue,
                rate: None,
                amount: dec("100"),
                source: AdjustmentSource::General,
            })
            .collect();

        let bytes = render_payslip(&doc).unwrap();
        let contents = page_contents(&bytes);
        assert!(contents.len() >= 2);

        for content in &contents {
            let decoded = Content::decode(content).unwrap();
            for op in decoded.operations.iter().filter(|op| op.operator == "Td") {
                let y = op.operands[1].as_i64().unwrap();
                assert!(y >= MARGIN_BOTTOM && y <= PAGE_HEIGHT, "line drawn at y = {}", y);
            }
        }

        let text = page_text(&bytes);
        for i in 1..=60 {
            let label = format!("Allowance {:02}", i);
            assert!(text.contains(&label), "missing '{}'", label);
        }
        for expected in ["Gross Salary", "PAYE Tax", "Net Pay", "53,000.00", "ETF", "Generated"] {
            assert!(text.contains(expected), "missing '{}'", expected);
        }
    }

    #[test]
    fn test_render_includes_every_section() {
        let text = page_text(&render_payslip(&document()).unwrap());

        for expected in [
            "Acme Foods",
            "Payslip for January 2026",
            "Nimal Perera",
            "emp_001",
            "Designation: Chef",
            "COLA",
            "10%",
            "55,000.00",
            "Meal Consumption",
            "PAYE Tax",
            "53,000.00",
            "ETF",
            "3%",
            "1,500.00",
        ] {
            assert!(text.contains(expected), "missing '{}'", expected);
        }
    }

    #[test]
    fn test_employer_section_omitted_without_contributions() {
        let mut doc = document();
        doc.employer_contributions.clear();
        let text = page_text(&render_payslip(&doc).unwrap());
        assert!(!text.contains("Employer Contributions"));
    }

    #[test]
    fn test_negative_net_pay_is_printed() {
        let mut doc = document();
        doc.breakdown.net_salary = dec("-1250.5");
        let text = page_text(&render_payslip(&doc).unwrap());
        assert!(text.contains("-1,250.50"));
    }
}
