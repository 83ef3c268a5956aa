//! OFX 2 output.
//!
//! Writes a [`Statement`] as an OFX 2.0.3 XML bank statement response. The
//! document is a tree of serde element structs serialized with `quick_xml`.
//! Elements without a value are left out, so a statement with no account id
//! has no `BANKACCTFROM` and an empty statement has no date range.

use anyhow::Result;
use chrono::NaiveDateTime;
use ofxwise_core::{BankAccount, Statement, StatementLine};
use serde::Serialize;

const OFX_DATE_FORMAT: &str = "%Y%m%d%H%M%S";

const OFX_HEADER: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"utf-8\" ?>\n",
    "<?OFX OFXHEADER=\"200\" VERSION=\"203\" SECURITY=\"NONE\" OLDFILEUID=\"NONE\" NEWFILEUID=\"NONE\"?>\n",
);

/// Format a timestamp the way OFX expects it.
pub fn format_ofx_date(date: &NaiveDateTime) -> String {
    date.format(OFX_DATE_FORMAT).to_string()
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "UPPERCASE")]
struct Ofx<'a> {
    signonmsgsrsv1: SignOnMsgsRsV1,
    bankmsgsrsv1: BankMsgsRsV1<'a>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "UPPERCASE")]
struct SignOnMsgsRsV1 {
    sonrs: SonRs,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "UPPERCASE")]
struct SonRs {
    status: Status,
    dtserver: String,
    language: &'static str,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "UPPERCASE")]
struct Status {
    code: u32,
    severity: &'static str,
}

impl Status {
    const fn ok() -> Self {
        Self {
            code: 0,
            severity: "INFO",
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "UPPERCASE")]
struct BankMsgsRsV1<'a> {
    stmttrnrs: StmtTrnRs<'a>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "UPPERCASE")]
struct StmtTrnRs<'a> {
    trnuid: u32,
    status: Status,
    stmtrs: StmtRs<'a>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "UPPERCASE")]
struct StmtRs<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    curdef: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bankacctfrom: Option<BankAcct<'a>>,
    banktranlist: BankTranList<'a>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "UPPERCASE")]
struct BankAcct<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    bankid: Option<&'a str>,
    acctid: &'a str,
    accttype: &'static str,
}

impl<'a> From<&'a BankAccount> for BankAcct<'a> {
    fn from(account: &'a BankAccount) -> Self {
        Self {
            bankid: Some(account.bank_id.as_str()).filter(|id| !id.is_empty()),
            acctid: &account.acct_id,
            accttype: "CHECKING",
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "UPPERCASE")]
struct BankTranList<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    dtstart: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dtend: Option<String>,
    #[serde(rename = "STMTTRN")]
    stmttrns: Vec<StmtTrn<'a>>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "UPPERCASE")]
struct StmtTrn<'a> {
    trntype: &'a str,
    dtposted: String,
    trnamt: String,
    fitid: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    refnum: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    memo: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bankacctto: Option<BankAcct<'a>>,
}

impl<'a> From<&'a StatementLine> for StmtTrn<'a> {
    fn from(line: &'a StatementLine) -> Self {
        Self {
            trntype: line.trntype.as_str(),
            dtposted: format_ofx_date(&line.date),
            trnamt: line.amount.to_string(),
            fitid: &line.id,
            refnum: line.refnum.as_deref(),
            memo: Some(line.memo.as_str()).filter(|m| !m.is_empty()),
            bankacctto: line.bank_account_to.as_ref().map(BankAcct::from),
        }
    }
}

impl<'a> Ofx<'a> {
    fn new(statement: &'a Statement, generated: NaiveDateTime) -> Self {
        let (dtstart, dtend) = statement
            .date_range()
            .map(|(start, end)| (format_ofx_date(&start), format_ofx_date(&end)))
            .unzip();

        Self {
            signonmsgsrsv1: SignOnMsgsRsV1 {
                sonrs: SonRs {
                    status: Status::ok(),
                    dtserver: format_ofx_date(&generated),
                    language: "ENG",
                },
            },
            bankmsgsrsv1: BankMsgsRsV1 {
                stmttrnrs: StmtTrnRs {
                    trnuid: 0,
                    status: Status::ok(),
                    stmtrs: StmtRs {
                        curdef: statement.currency.as_deref(),
                        bankacctfrom: statement.account_id.as_deref().map(|acctid| BankAcct {
                            bankid: None,
                            acctid,
                            accttype: "CHECKING",
                        }),
                        banktranlist: BankTranList {
                            dtstart,
                            dtend,
                            stmttrns: statement.lines.iter().map(StmtTrn::from).collect(),
                        },
                    },
                },
            },
        }
    }
}

/// Render `statement` as an OFX document.
///
/// `generated` becomes the signon `DTSERVER`; passing it in keeps the
/// output reproducible.
pub fn to_ofx_string(statement: &Statement, generated: NaiveDateTime) -> Result<String> {
    let mut out = String::from(OFX_HEADER);
    let mut ser = quick_xml::se::Serializer::with_root(&mut out, Some("OFX"))?;
    ser.indent(' ', 2);
    Ofx::new(statement, generated).serialize(ser)?;
    out.push('\n');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ofxwise_core::TransactionType;
    use rust_decimal_macros::dec;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_format_ofx_date() {
        assert_eq!(format_ofx_date(&at(2024, 1, 15, 13)), "20240115130000");
    }

    #[test]
    fn test_transaction_elements() {
        let line = StatementLine::new(at(2024, 1, 15, 0), dec!(-12.50))
            .with_id("T1")
            .with_memo("Coffee & cake")
            .with_refnum("TRANSFER-1")
            .with_bank_account_to(BankAccount::account_only("GB29NWBK"));
        let statement = Statement::new()
            .with_currency("USD")
            .with_account_id("P1234")
            .with_line(line);

        let ofx = to_ofx_string(&statement, at(2024, 2, 1, 9)).unwrap();

        assert!(ofx.starts_with("<?xml"));
        assert!(ofx.contains("<?OFX OFXHEADER=\"200\""));
        assert!(ofx.contains("<DTSERVER>20240201090000</DTSERVER>"));
        assert!(ofx.contains("<CURDEF>USD</CURDEF>"));
        assert!(ofx.contains("<BANKACCTFROM>"));
        assert!(ofx.contains("<ACCTID>P1234</ACCTID>"));
        assert!(ofx.contains("<TRNTYPE>CREDIT</TRNTYPE>"));
        assert!(ofx.contains("<TRNAMT>-12.50</TRNAMT>"));
        assert!(ofx.contains("<FITID>T1</FITID>"));
        assert!(ofx.contains("<REFNUM>TRANSFER-1</REFNUM>"));
        assert!(ofx.contains("<MEMO>Coffee &amp; cake</MEMO>"));
        assert!(ofx.contains("<BANKACCTTO>"));
        assert!(ofx.contains("<ACCTID>GB29NWBK</ACCTID>"));
        assert!(!ofx.contains("<BANKID>"));
        assert!(ofx.contains("<DTSTART>20240115000000</DTSTART>"));
        assert!(ofx.contains("<DTEND>20240115000000</DTEND>"));
        assert!(ofx.trim_end().ends_with("</OFX>"));
    }

    #[test]
    fn test_memo_markup_is_escaped() {
        let line = StatementLine::new(at(2024, 1, 15, 0), dec!(1))
            .with_id("T1")
            .with_memo("<b>Tom</b> & Jerry");
        let ofx = to_ofx_string(&Statement::new().with_line(line), at(2024, 2, 1, 9)).unwrap();
        assert!(ofx.contains("&lt;b&gt;Tom&lt;/b&gt; &amp; Jerry"));
        assert!(!ofx.contains("<b>"));
    }

    #[test]
    fn test_optional_elements_omitted() {
        let ofx = to_ofx_string(&Statement::new(), at(2024, 2, 1, 9)).unwrap();

        assert!(!ofx.contains("<CURDEF>"));
        assert!(!ofx.contains("<BANKACCTFROM>"));
        assert!(!ofx.contains("<DTSTART>"));
        assert!(!ofx.contains("<STMTTRN>"));
        assert!(ofx.contains("BANKTRANLIST"));
    }

    #[test]
    fn test_passthrough_trntype() {
        let line = StatementLine::new(at(2024, 1, 15, 0), dec!(5))
            .with_id("T1")
            .with_trntype(TransactionType::Other("FEE".to_string()));
        let ofx = to_ofx_string(&Statement::new().with_line(line), at(2024, 2, 1, 9)).unwrap();
        assert!(ofx.contains("<TRNTYPE>FEE</TRNTYPE>"));
        assert!(!ofx.contains("<MEMO>"));
    }

    #[test]
    fn test_bank_id_written_when_known() {
        let line = StatementLine::new(at(2024, 1, 15, 0), dec!(5))
            .with_id("T1")
            .with_bank_account_to(BankAccount::new("NWBKGB2L", "GB29NWBK"));
        let ofx = to_ofx_string(&Statement::new().with_line(line), at(2024, 2, 1, 9)).unwrap();
        assert!(ofx.contains("<BANKID>NWBKGB2L</BANKID>"));
    }

    #[test]
    fn test_one_stmttrn_per_line_in_order() {
        let statement = Statement::new()
            .with_account_id("A")
            .with_line(StatementLine::new(at(2024, 1, 16, 0), dec!(1)).with_id("second"))
            .with_line(StatementLine::new(at(2024, 1, 15, 0), dec!(2)).with_id("first"));
        let ofx = to_ofx_string(&statement, at(2024, 2, 1, 9)).unwrap();

        assert_eq!(ofx.matches("<STMTTRN>").count(), 2);
        assert_eq!(ofx.matches("</STMTTRN>").count(), 2);
        let second = ofx.find("<FITID>second</FITID>").unwrap();
        let first = ofx.find("<FITID>first</FITID>").unwrap();
        assert!(second < first);
        assert!(ofx.contains("<DTSTART>20240115000000</DTSTART>"));
        assert!(ofx.contains("<DTEND>20240116000000</DTEND>"));
    }
}
