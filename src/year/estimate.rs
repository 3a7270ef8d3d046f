//! Entry-year estimation from the model key.
//!
//! The built-in table maps aircraft families and series to the year the type
//! entered service. Keys arrive in two shapes, vendor-prefixed names
//! ("Airbus A320neo") and bare ICAO designators ("A20N"), so both forms are
//! listed. Matching is case-sensitive prefix matching on the trimmed key.
//!
//! Within a family the more specific prefix must come first ("A339" before
//! "A33"); [`RuleSet::shadowed`] catches violations.

use std::path::Path;

use crate::error::Result;
use crate::rules::table::load_year_table;
use crate::rules::{Field, Pattern, Rule, RuleSet, Subject};

/// Version tag of [`BUILTIN_YEAR_TABLE`].
pub const BUILTIN_TABLE_VERSION: &str = "2024.2";

#[rustfmt::skip]
pub const BUILTIN_YEAR_TABLE: &[(&str, i32)] = &[
    // Airbus, vendor-prefixed
    ("Airbus A319neo", 2019), ("Airbus A320neo", 2016), ("Airbus A321neo", 2017),
    ("Airbus A318", 2003), ("Airbus A319", 1996), ("Airbus A321", 1994),
    ("Airbus A31", 1983), ("Airbus A32", 1988),
    ("Airbus A330-900", 2018), ("Airbus A330-800", 2020), ("Airbus A330-200", 1998),
    ("Airbus A33", 1994),
    ("Airbus A340-500", 2003), ("Airbus A340-600", 2002), ("Airbus A34", 1993),
    ("Airbus A350-1000", 2018), ("Airbus A35", 2015),
    ("Airbus A38", 2007), ("Airbus A300-600", 1984), ("Airbus A30", 1974), ("Airbus A22", 2016),
    // Airbus, ICAO
    ("A19N", 2019), ("A20N", 2016), ("A21N", 2017),
    ("A318", 2003), ("A319", 1996), ("A320", 1988), ("A321", 1994), ("A32", 1988),
    ("A306", 1984), ("A30B", 1974), ("A310", 1983),
    ("A338", 2020), ("A339", 2018), ("A332", 1998), ("A333", 1994), ("A33", 1994),
    ("A342", 1993), ("A343", 1993), ("A345", 2003), ("A346", 2002), ("A34", 1993),
    ("A359", 2015), ("A35K", 2018), ("A35", 2015),
    ("A388", 2007), ("A38", 2007),
    ("BCS1", 2016), ("BCS3", 2016), ("A22", 2016),
    // Boeing, vendor-prefixed
    ("Boeing 737 MAX 9", 2018), ("Boeing 737 MAX", 2017),
    ("Boeing 737-200", 1968), ("Boeing 737-300", 1984), ("Boeing 737-400", 1988),
    ("Boeing 737-500", 1990), ("Boeing 737-600", 1998), ("Boeing 737-700", 1998),
    ("Boeing 737-800", 1998), ("Boeing 737-900", 2001), ("Boeing 737", 1968),
    ("Boeing 747-8", 2011), ("Boeing 747-400", 1989), ("Boeing 747", 1970),
    ("Boeing 757-300", 2002), ("Boeing 757", 1983),
    ("Boeing 767-300", 1986), ("Boeing 767-400", 2000), ("Boeing 767", 1982),
    ("Boeing 777-300ER", 2004), ("Boeing 777-300", 1998), ("Boeing 777-200LR", 2006),
    ("Boeing 777", 1995),
    ("Boeing 787-10", 2018), ("Boeing 787-9", 2014), ("Boeing 787", 2011),
    ("Boeing 717", 1999),
    // Boeing, ICAO
    ("B38M", 2017), ("B39M", 2018),
    ("B712", 1999),
    ("B732", 1968), ("B733", 1984), ("B734", 1988), ("B735", 1990),
    ("B736", 1998), ("B737", 1998), ("B738", 1998), ("B739", 2001), ("B73", 1968),
    ("B744", 1989), ("B748", 2011), ("B74", 1970),
    ("B752", 1983), ("B753", 2002), ("B75", 1983),
    ("B762", 1982), ("B763", 1986), ("B764", 2000), ("B76", 1982),
    ("B77W", 2004), ("B77L", 2006), ("B772", 1995), ("B773", 1998), ("B77", 1995),
    ("B788", 2011), ("B789", 2014), ("B78X", 2018), ("B78", 2011),
    // Embraer
    ("Embraer E190-E2", 2018), ("Embraer E195-E2", 2019),
    ("Embraer E175", 2005), ("Embraer E17", 2004),
    ("Embraer E195", 2006), ("Embraer E19", 2005),
    ("Embraer ERJ-135", 1999), ("Embraer ERJ135", 1999), ("Embraer ERJ", 1997),
    ("E290", 2018), ("E295", 2019),
    ("E170", 2004), ("E75L", 2005), ("E75S", 2005), ("E75", 2005),
    ("E190", 2005), ("E195", 2006), ("E135", 1999), ("E145", 1997),
    // Bombardier
    ("Bombardier CRJ1000", 2010), ("Bombardier CRJ900", 2003), ("Bombardier CRJ700", 2001),
    ("Bombardier CRJ", 1992),
    ("Bombardier CS100", 2016), ("Bombardier CS300", 2016),
    ("Bombardier Q400", 2000), ("Bombardier Dash 8-400", 2000), ("Bombardier Dash 8 Q400", 2000),
    ("Bombardier Dash 8-300", 1989), ("Bombardier Dash 8-200", 1992), ("Bombardier Dash 8", 1984),
    ("CRJ9", 2003), ("CRJX", 2010), ("CRJ7", 2001), ("CRJ2", 1992), ("CRJ1", 1992), ("CRJ", 1992),
    // ATR
    ("ATR 72-600", 2011), ("ATR 72-500", 1997), ("ATR 42-600", 2012), ("ATR 42-500", 1996),
    ("ATR 72", 1989), ("ATR 42", 1985),
    ("AT76", 2011), ("AT46", 2012), ("AT75", 1997), ("AT45", 1996), ("AT72", 1989), ("AT43", 1985),
    ("AT7", 1989), ("AT4", 1985),
    // De Havilland Canada
    ("DH8D", 2000), ("DH8C", 1989), ("DH8B", 1992), ("DH8A", 1984), ("DH8", 1984),
    // Others
    ("C919", 2023), ("AJ27", 2016), ("SU95", 2011),
];

#[derive(Debug, Clone)]
pub struct YearEstimator {
    rules: RuleSet<i32>,
}

impl Default for YearEstimator {
    fn default() -> Self {
        Self::builtin()
    }
}

impl YearEstimator {
    pub fn builtin() -> Self {
        let rules = BUILTIN_YEAR_TABLE
            .iter()
            .map(|&(prefix, year)| Rule::new(Field::ModelKey, Pattern::prefix(prefix), year))
            .collect();
        Self::from_rules(RuleSet::new(rules))
    }

    pub fn from_rules(rules: RuleSet<i32>) -> Self {
        Self { rules }
    }

    /// Loads a replacement table (see [`crate::rules::table`]).
    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self::from_rules(load_year_table(path)?))
    }

    pub fn rules(&self) -> &RuleSet<i32> {
        &self.rules
    }

    /// Year of the first rule matching `model_key`, if any.
    pub fn estimate(&self, model_key: Option<&str>) -> Option<i32> {
        let key = model_key.map(str::trim).filter(|k| !k.is_empty());
        self.rules.evaluate(&Subject::model(key)).copied()
    }
}
