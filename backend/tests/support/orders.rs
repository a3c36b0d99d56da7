//! Order number fixtures.

use loyalty_backend::domain::OrderNumber;

/// Append the Luhn check digit to `payload` and validate the result.
pub fn luhn_order(payload: u64) -> OrderNumber {
    let digits = payload.to_string();
    let sum: u32 = digits
        .bytes()
        .rev()
        .map(|b| u32::from(b - b'0'))
        .enumerate()
        .map(|(index, digit)| {
            // The check digit will sit at position zero, so payload digits
            // at even offsets from the right are the doubled ones.
            if index % 2 == 0 {
                let doubled = digit * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                digit
            }
        })
        .sum();
    let check = (10 - sum % 10) % 10;
    OrderNumber::new(format!("{digits}{check}")).expect("generated number passes Luhn")
}
