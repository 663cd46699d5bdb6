// Currency code handling: normalization, geo-header resolution and conversion

use axum::http::HeaderMap;

use crate::unified::CurrencyRates;

pub const FALLBACK_CURRENCY: &str = "INR";

// ISO 3166-1 alpha-2 country -> ISO 4217 currency, sorted by country
const COUNTRY_CURRENCIES: &[(&str, &str)] = &[
    ("AD", "EUR"),
    ("AE", "AED"),
    ("AF", "AFN"),
    ("AG", "XCD"),
    ("AI", "XCD"),
    ("AL", "ALL"),
    ("AM", "AMD"),
    ("AO", "AOA"),
    ("AQ", "USD"),
    ("AR", "ARS"),
    ("AS", "USD"),
    ("AT", "EUR"),
    ("AU", "AUD"),
    ("AW", "AWG"),
    ("AX", "EUR"),
    ("AZ", "AZN"),
    ("BA", "BAM"),
    ("BB", "BBD"),
    ("BD", "BDT"),
    ("BE", "EUR"),
    ("BF", "XOF"),
    ("BG", "BGN"),
    ("BH", "BHD"),
    ("BI", "BIF"),
    ("BJ", "XOF"),
    ("BL", "EUR"),
    ("BM", "BMD"),
    ("BN", "BND"),
    ("BO", "BOB"),
    ("BQ", "USD"),
    ("BR", "BRL"),
    ("BS", "BSD"),
    ("BT", "BTN"),
    ("BV", "NOK"),
    ("BW", "BWP"),
    ("BY", "BYN"),
    ("BZ", "BZD"),
    ("CA", "CAD"),
    ("CC", "AUD"),
    ("CD", "CDF"),
    ("CF", "XAF"),
    ("CG", "XAF"),
    ("CH", "CHF"),
    ("CI", "XOF"),
    ("CK", "NZD"),
    ("CL", "CLP"),
    ("CM", "XAF"),
    ("CN", "CNY"),
    ("CO", "COP"),
    ("CR", "CRC"),
    ("CU", "CUP"),
    ("CV", "CVE"),
    ("CW", "ANG"),
    ("CX", "AUD"),
    ("CY", "EUR"),
    ("CZ", "CZK"),
    ("DE", "EUR"),
    ("DJ", "DJF"),
    ("DK", "DKK"),
    ("DM", "XCD"),
    ("DO", "DOP"),
    ("DZ", "DZD"),
    ("EC", "USD"),
    ("EE", "EUR"),
    ("EG", "EGP"),
    ("EH", "MAD"),
    ("ER", "ERN"),
    ("ES", "EUR"),
    ("ET", "ETB"),
    ("FI", "EUR"),
    ("FJ", "FJD"),
    ("FK", "FKP"),
    ("FM", "USD"),
    ("FO", "DKK"),
    ("FR", "EUR"),
    ("GA", "XAF"),
    ("GB", "GBP"),
    ("GD", "XCD"),
    ("GE", "GEL"),
    ("GF", "EUR"),
    ("GG", "GBP"),
    ("GH", "GHS"),
    ("GI", "GIP"),
    ("GL", "DKK"),
    ("GM", "GMD"),
    ("GN", "GNF"),
    ("GP", "EUR"),
    ("GQ", "XAF"),
    ("GR", "EUR"),
    ("GS", "GBP"),
    ("GT", "GTQ"),
    ("GU", "USD"),
    ("GW", "XOF"),
    ("GY", "GYD"),
    ("HK", "HKD"),
    ("HM", "AUD"),
    ("HN", "HNL"),
    ("HR", "EUR"),
    ("HT", "HTG"),
    ("HU", "HUF"),
    ("ID", "IDR"),
    ("IE", "EUR"),
    ("IL", "ILS"),
    ("IM", "GBP"),
    ("IN", "INR"),
    ("IO", "USD"),
    ("IQ", "IQD"),
    ("IR", "IRR"),
    ("IS", "ISK"),
    ("IT", "EUR"),
    ("JE", "GBP"),
    ("JM", "JMD"),
    ("JO", "JOD"),
    ("JP", "JPY"),
    ("KE", "KES"),
    ("KG", "KGS"),
    ("KH", "KHR"),
    ("KI", "AUD"),
    ("KM", "KMF"),
    ("KN", "XCD"),
    ("KP", "KPW"),
    ("KR", "KRW"),
    ("KW", "KWD"),
    ("KY", "KYD"),
    ("KZ", "KZT"),
    ("LA", "LAK"),
    ("LB", "LBP"),
    ("LC", "XCD"),
    ("LI", "CHF"),
    ("LK", "LKR"),
    ("LR", "LRD"),
    ("LS", "LSL"),
    ("LT", "EUR"),
    ("LU", "EUR"),
    ("LV", "EUR"),
    ("LY", "LYD"),
    ("MA", "MAD"),
    ("MC", "EUR"),
    ("MD", "MDL"),
    ("ME", "EUR"),
    ("MF", "EUR"),
    ("MG", "MGA"),
    ("MH", "USD"),
    ("MK", "MKD"),
    ("ML", "XOF"),
    ("MM", "MMK"),
    ("MN", "MNT"),
    ("MO", "MOP"),
    ("MP", "USD"),
    ("MQ", "EUR"),
    ("MR", "MRU"),
    ("MS", "XCD"),
    ("MT", "EUR"),
    ("MU", "MUR"),
    ("MV", "MVR"),
    ("MW", "MWK"),
    ("MX", "MXN"),
    ("MY", "MYR"),
    ("MZ", "MZN"),
    ("NA", "NAD"),
    ("NC", "XPF"),
    ("NE", "XOF"),
    ("NF", "AUD"),
    ("NG", "NGN"),
    ("NI", "NIO"),
    ("NL", "EUR"),
    ("NO", "NOK"),
    ("NP", "NPR"),
    ("NR", "AUD"),
    ("NU", "NZD"),
    ("NZ", "NZD"),
    ("OM", "OMR"),
    ("PA", "PAB"),
    ("PE", "PEN"),
    ("PF", "XPF"),
    ("PG", "PGK"),
    ("PH", "PHP"),
    ("PK", "PKR"),
    ("PL", "PLN"),
    ("PM", "EUR"),
    ("PN", "NZD"),
    ("PR", "USD"),
    ("PS", "ILS"),
    ("PT", "EUR"),
    ("PW", "USD"),
    ("PY", "PYG"),
    ("QA", "QAR"),
    ("RE", "EUR"),
    ("RO", "RON"),
    ("RS", "RSD"),
    ("RU", "RUB"),
    ("RW", "RWF"),
    ("SA", "SAR"),
    ("SB", "SBD"),
    ("SC", "SCR"),
    ("SD", "SDG"),
    ("SE", "SEK"),
    ("SG", "SGD"),
    ("SH", "SHP"),
    ("SI", "EUR"),
    ("SJ", "NOK"),
    ("SK", "EUR"),
    ("SL", "SLE"),
    ("SM", "EUR"),
    ("SN", "XOF"),
    ("SO", "SOS"),
    ("SR", "SRD"),
    ("SS", "SSP"),
    ("ST", "STN"),
    ("SV", "USD"),
    ("SX", "ANG"),
    ("SY", "SYP"),
    ("SZ", "SZL"),
    ("TC", "USD"),
    ("TD", "XAF"),
    ("TF", "EUR"),
    ("TG", "XOF"),
    ("TH", "THB"),
    ("TJ", "TJS"),
    ("TK", "NZD"),
    ("TL", "USD"),
    ("TM", "TMT"),
    ("TN", "TND"),
    ("TO", "TOP"),
    ("TR", "TRY"),
    ("TT", "TTD"),
    ("TV", "AUD"),
    ("TW", "TWD"),
    ("TZ", "TZS"),
    ("UA", "UAH"),
    ("UG", "UGX"),
    ("UM", "USD"),
    ("US", "USD"),
    ("UY", "UYU"),
    ("UZ", "UZS"),
    ("VA", "EUR"),
    ("VC", "XCD"),
    ("VE", "VES"),
    ("VG", "USD"),
    ("VI", "USD"),
    ("VN", "VND"),
    ("VU", "VUV"),
    ("WF", "XPF"),
    ("WS", "WST"),
    ("XK", "EUR"),
    ("YE", "YER"),
    ("YT", "EUR"),
    ("ZA", "ZAR"),
    ("ZM", "ZMW"),
    ("ZW", "ZWL"),
];

const COUNTRY_HEADERS: [&str; 3] = ["x-vercel-ip-country", "cf-ipcountry", "x-country-code"];
const CURRENCY_COOKIES: [&str; 2] = ["user-currency", "currency"];

pub fn is_supported_currency(code: &str) -> bool {
    COUNTRY_CURRENCIES.iter().any(|(_, currency)| *currency == code)
}

// Upper-cases a known code; anything unknown becomes `default`
pub fn normalize_currency_code(value: Option<&str>, default: &str) -> String {
    let code = value.unwrap_or_default().trim().to_uppercase();
    if is_supported_currency(&code) {
        code
    } else {
        default.to_string()
    }
}

pub fn currency_for_country(country: Option<&str>, default: &str) -> String {
    let country = country.unwrap_or_default().trim().to_uppercase();
    let mapped = COUNTRY_CURRENCIES
        .binary_search_by(|(code, _)| (*code).cmp(country.as_str()))
        .ok()
        .map(|index| COUNTRY_CURRENCIES[index].1);
    normalize_currency_code(mapped, default)
}

// "en-GB,en;q=0.9" -> "GB"
fn country_from_accept_language(value: &str) -> Option<String> {
    let locale = value.split(',').next()?.split(';').next()?.trim();
    let region = locale.replace('_', "-").split('-').nth(1)?.to_string();
    (region.len() == 2).then(|| region.to_uppercase())
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

pub fn resolve_currency_from_headers(headers: &HeaderMap, default: &str) -> String {
    if let Some(country) = COUNTRY_HEADERS.iter().find_map(|name| header_str(headers, name)) {
        return currency_for_country(Some(country), default);
    }

    match header_str(headers, "accept-language").and_then(country_from_accept_language) {
        Some(country) => currency_for_country(Some(&country), default),
        None => default.to_string(),
    }
}

fn cookie_value<'a>(cookie_header: &'a str, name: &str) -> Option<&'a str> {
    cookie_header
        .split(';')
        .filter_map(|part| part.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

// An explicit user choice stored in cookies wins over geo headers
pub fn resolve_request_currency(headers: &HeaderMap, default: &str) -> String {
    let from_cookie = header_str(headers, "cookie")
        .and_then(|cookies| CURRENCY_COOKIES.iter().find_map(|name| cookie_value(cookies, name)));

    match from_cookie {
        Some(code) => normalize_currency_code(Some(code), default),
        None => resolve_currency_from_headers(headers, default),
    }
}

// Converts through the rates' base. None when either currency has no rate.
pub fn try_convert_amount(amount: f64, from: &str, to: &str, rates: &CurrencyRates) -> Option<f64> {
    let from = from.trim().to_uppercase();
    let to = to.trim().to_uppercase();
    if from == to {
        return Some(amount);
    }

    let rate_of = |code: &str| -> Option<f64> {
        if code == rates.base {
            Some(1.0)
        } else {
            rates.rates.get(code).copied().filter(|r| *r > 0.0)
        }
    };

    Some(amount / rate_of(&from)? * rate_of(&to)?)
}
