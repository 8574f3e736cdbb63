use crate::config::BookingPlan;
use std::io::BufRead;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Yes,
    No,
    Invalid,
}

/// `y` 繼續；`n` 或直接按 Enter 離開；其他輸入視為無效
pub fn parse_answer(input: &str) -> Confirmation {
    match input.trim().to_lowercase().as_str() {
        "y" => Confirmation::Yes,
        "n" | "" => Confirmation::No,
        _ => Confirmation::Invalid,
    }
}

/// 讀一行回答；輸入已結束（EOF）時視為無效
pub fn read_answer(reader: &mut impl BufRead) -> std::io::Result<Confirmation> {
    let mut input = String::new();
    if reader.read_line(&mut input)? == 0 {
        return Ok(Confirmation::Invalid);
    }
    Ok(parse_answer(&input))
}

pub fn summary(plan: &BookingPlan, dry_run: bool) -> String {
    let window = &plan.job.criterion.time_window;
    let mut lines = vec![format!(
        "This tool will check for appointments on location '{}' between {} and {}.",
        plan.job.criterion.location_substring(),
        window.lower,
        window.upper
    )];
    if !dry_run {
        lines.push(format!(
            "This tool will also book a matching appointment for the mail address '{}'.",
            plan.job.contact_address
        ));
    }
    lines.join("\n")
}
