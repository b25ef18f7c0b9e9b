const ONES: [&str; 20] = [
    "", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten",
    "Eleven", "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen", "Eighteen",
    "Nineteen",
];
const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

fn below_hundred(n: u64, out: &mut Vec<&'static str>) {
    let n = n as usize;
    if n < 20 {
        if n > 0 {
            out.push(ONES[n]);
        }
    } else {
        out.push(TENS[n / 10]);
        if n % 10 > 0 {
            out.push(ONES[n % 10]);
        }
    }
}

// Indian grouping: crore, lakh, thousand, hundred.
fn spell(mut n: u64, out: &mut Vec<&'static str>) {
    let crore = n / 10_000_000;
    n %= 10_000_000;
    if crore > 0 {
        spell(crore, out);
        out.push("Crore");
    }
    for (unit, name) in [(100_000, "Lakh"), (1_000, "Thousand"), (100, "Hundred")] {
        let count = n / unit;
        n %= unit;
        if count > 0 {
            below_hundred(count, out);
            out.push(name);
        }
    }
    below_hundred(n, out);
}

pub fn number_in_words(n: u64) -> String {
    if n == 0 {
        return "Zero".to_string();
    }
    let mut parts = Vec::new();
    spell(n, &mut parts);
    parts.join(" ")
}

pub fn amount_in_words(rupees: u64) -> String {
    if rupees == 0 {
        return "Zero".to_string();
    }
    format!("{} Rupees Only", number_in_words(rupees))
}

pub fn amount_in_words_paise(paise: u64) -> String {
    let rupees = paise / 100;
    let minor = paise % 100;
    if minor == 0 {
        return amount_in_words(rupees);
    }
    if rupees == 0 {
        return format!("{} Paise Only", number_in_words(minor));
    }
    format!(
        "{} Rupees and {} Paise Only",
        number_in_words(rupees),
        number_in_words(minor)
    )
}

/// Formats paise as rupees with Indian digit grouping, e.g. `1,00,000.00`.
pub fn format_inr(paise: u64) -> String {
    let rupees = (paise / 100).to_string();
    let minor = paise % 100;
    let grouped = if rupees.len() <= 3 {
        rupees
    } else {
        let (head, last3) = rupees.split_at(rupees.len() - 3);
        let mut groups: Vec<&str> = Vec::new();
        let mut end = head.len();
        while end > 2 {
            groups.push(&head[end - 2..end]);
            end -= 2;
        }
        groups.push(&head[..end]);
        groups.reverse();
        format!("{},{}", groups.join(","), last3)
    };
    format!("{}.{:02}", grouped, minor)
}
