use chrono::NaiveDate;

use crate::model::{employee::Employee, resignation::Resignation};

/// Placeholder printed where the employee fills in by hand.
pub const BLANK: &str = "_________________";

const STYLE: &str = "body{font-family:Georgia,serif;max-width:720px;margin:40px auto;color:#222}\
h1{text-align:center;font-size:22px;letter-spacing:1px}\
table{width:100%;border-collapse:collapse;margin:24px 0}\
td{padding:8px 4px;vertical-align:top}\
td.label{width:35%;font-weight:bold}\
.reason{min-height:80px;border:1px solid #999;padding:8px}\
.signatures{display:flex;justify-content:space-between;margin-top:64px}\
.signatures div{text-align:center;width:30%}";

pub struct ResignationForm {
    pub file_name: String,
    pub html: String,
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn or_blank(value: Option<String>) -> String {
    value
        .map(|v| escape(v.trim()))
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| BLANK.to_string())
}

pub fn file_name(employee_name: &str, date: NaiveDate) -> String {
    let name: String = employee_name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");
    format!("Resignation_Form_{}_{}.html", name, date.format("%Y-%m-%d"))
}

/// Printable form, pre-filled from the employee and their resignation when
/// one exists.
pub fn render(employee: &Employee, resignation: Option<&Resignation>, today: NaiveDate) -> ResignationForm {
    let rows = [
        ("Employee Name", Some(employee.name.clone())),
        ("Employee Code", Some(employee.code.clone())),
        ("Designation", Some(employee.designation.clone())),
        ("Department", Some(employee.department.clone())),
        ("Faculty", Some(employee.faculty.clone())),
        ("Joining Date", Some(employee.joining_date.to_string())),
        ("Submission Date", resignation.map(|r| r.submitted_on.to_string())),
        ("Last Working Day", resignation.map(|r| r.last_working_day.to_string())),
    ];
    let table: String = rows
        .into_iter()
        .map(|(label, value)| format!("<tr><td class=\"label\">{}</td><td>{}</td></tr>", label, or_blank(value)))
        .collect();
    let reason = or_blank(resignation.map(|r| r.reason.clone()));

    let html = format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Resignation Form - {name}</title>\n\
<style>{style}</style>\n</head>\n<body>\n<h1>RESIGNATION FORM</h1>\n<table>{table}</table>\n\
<h3>Reason for Resignation</h3>\n<div class=\"reason\">{reason}</div>\n\
<div class=\"signatures\">\
<div>{blank}<br>Employee Signature</div>\
<div>{blank}<br>Head of Department</div>\
<div>{blank}<br>HR Office</div>\
</div>\n<p>Date: {blank}</p>\n</body>\n</html>\n",
        name = escape(&employee.name),
        style = STYLE,
        table = table,
        reason = reason,
        blank = BLANK,
    );

    ResignationForm {
        file_name: file_name(&employee.name, today),
        html,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::employee::tests::sample_employee;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn file_name_uses_name_and_date() {
        assert_eq!(
            file_name("Ayesha  Karim", date(2026, 3, 1)),
            "Resignation_Form_Ayesha_Karim_2026-03-01.html"
        );
    }

    #[test]
    fn blank_form_leaves_lines_to_fill() {
        let employee = sample_employee(1, "Ayesha <Karim>", "female");
        let form = render(&employee, None, date(2026, 3, 1));

        assert!(form.html.contains("<style>"));
        assert!(form.html.contains("Ayesha &lt;Karim&gt;"));
        assert!(form.html.contains(&format!("<td class=\"label\">Last Working Day</td><td>{}</td>", BLANK)));
        assert!(!form.html.contains("<Karim>"));
    }
}
