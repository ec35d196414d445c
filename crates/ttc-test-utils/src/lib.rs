//! Testing utilities for the Trace the Change workspace
//!
//! Shared fixtures for donation records and request bodies.

#![allow(missing_docs)]

use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use ttc_core::{Donation, Donor, NewDonation, PaymentMethod};

pub fn donor(email: &str) -> Donor {
    Donor {
        first_name: "John".to_string(),
        last_name: "Doe".to_string(),
        email: email.to_string(),
        phone: Some("123-456-7890".to_string()),
        is_anonymous: false,
    }
}

pub fn new_donation(email: &str, amount: i64) -> NewDonation {
    NewDonation {
        donor: donor(email),
        charity: "global-water-foundation".to_string(),
        amount: Decimal::from(amount),
        currency: "USD".to_string(),
        payment_method: PaymentMethod::CreditCard,
        message: None,
    }
}

pub fn donation_for(email: &str, amount: i64) -> Donation {
    Donation::from_request_at(new_donation(email, amount), Utc::now())
}

pub fn sample_donation() -> Donation {
    donation_for("a@x.com", 50)
}

/// JSON body as the browser form posts it
pub fn donation_body(email: &str, amount: i64) -> Value {
    json!({
        "donor": {
            "firstName": "John",
            "lastName": "Doe",
            "email": email,
            "phone": "123-456-7890",
            "isAnonymous": false
        },
        "charity": "global-water-foundation",
        "amount": amount,
        "currency": "USD",
        "paymentMethod": "credit-card"
    })
}
