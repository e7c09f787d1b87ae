//! Hand-curated name -> UNII assignments that the search gets wrong or misses

use std::io::BufRead;
use std::path::Path;

use rustc_hash::FxHashMap;

use crate::error::ResolveError;
use crate::unii::is_valid_unii;

const SINGLE: &[(&str, &str)] = &[
    ("PEMETREXED SODIUM", "2PKU919BA9"),
    ("NETARSUDIL DIMESYLATE", "VL756B1K0U"),
    ("INSULIN LISPRO RECOMBINANT", "GFX7QIS1II"),
    ("INSULIN SUSP ISOPHANE RECOMBINANT HUMAN", "1Y17CTI5SR"),
    ("PITAVASTATIN MAGNESIUM", "M5681Q5F9P"),
    ("IVACAFTOR, TEZACAFTOR", "8RW88Y506K"),
    ("NITROGEN, NF", "N762921K75"),
    ("ELEXACAFTOR, IVACAFTOR, TEZACAFTOR", "RRN67GMB0V"),
    ("GALLIUM DOTATOC GA-68", "Y68179SY2L"),
    ("GALLIUM DOTATATE GA-68", "9L17Y0H71P"),
    ("SIPONIMOD FUMARIC ACID", "Z7G02XZ0M6"),
    ("OMEGA-3-ACID ETHYL ESTERS TYPE A", "D87YGH4Z0Q"),
    ("GRISEOFULVIN, ULTRAMICROSIZE", "32HRV3E3D5"),
    ("FISH OIL TRIGLYCERIDES", "XGF7L72M0F"),
    ("COAGULATION FACTOR XA (RECOMBINANT), INACTIVATED - ZHZO", "BI009E452R"),
    ("FAM-TRASTUZUMAB DERUXTECAN-NXKI", "5384HK7574"),
    ("OMBITASVIR, PARITAPREVIR, RITONAVIR", "OU2YM37K86"),
    ("MYCOPHENOLIC SODIUM", "WX877SQI1G"),
];

const MULTI: &[(&str, &[&str])] = &[
    ("MUROMANAB-CD3", &["JGA39ICE2V"]),
    ("SIMETHICONE", &["92RU3N3Y1O", "ETJ7Z6XBU4"]),
    (
        "CONJUGATED ESTROGENS/MEDROXYPROGESTERONE ACETATE",
        &["IU5QR144QX", "C2QI4IOI2G"],
    ),
    (
        "LAMIVUDINE, NEVIRAPINE, AND STAVUDINE",
        &["2T8Q726O95", "99DK7FVK1H", "BO9LE4QFZF"],
    ),
    ("IRBESARTAN: HYDROCHLOROTHIAZIDE", &["J0E2756Z7N", "0J48LPH2TH"]),
    (
        "LINAGLIPTIN AND METFORMIN HYDROCHLORIDE",
        &["3X29ZEJ4R2", "786Z46389E"],
    ),
    ("DARATUMUMAB AND HYALURONIDASE-FIHJ", &["4Z63YK6E0E", "743QUY4VD8"]),
    ("INSULIN DEGLUDEC AND INSULIN ASPART", &["54Q18076QB", "D933668QVX"]),
];

/// Name -> one or more UNIIs. Names are stored upper-case.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    map: FxHashMap<String, Vec<String>>,
}

impl Overrides {
    /// Small seed of known-bad search results and combination products.
    pub fn builtin() -> Self {
        let mut overrides = Self::default();
        for (name, unii) in SINGLE {
            overrides.insert(name, vec![(*unii).to_string()]);
        }
        for (name, uniis) in MULTI {
            overrides.insert(name, uniis.iter().map(|u| (*u).to_string()).collect());
        }
        overrides
    }

    pub fn insert(&mut self, name: &str, uniis: Vec<String>) {
        self.map.insert(name.trim().to_uppercase(), uniis);
    }

    /// All codes assigned to `name`.
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.map.get(name).map(Vec::as_slice)
    }

    /// The code for `name` when exactly one is assigned.
    pub fn single(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some([one]) => Some(one.as_str()),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Read `NAME<TAB>UNII[|UNII...]` lines. Blank lines and `#` comments are skipped.
    pub fn read<R: BufRead>(&mut self, reader: R) -> Result<usize, ResolveError> {
        let mut added = 0;
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((name, codes)) = line.split_once('\t') else {
                return Err(ResolveError::Format {
                    line: i + 1,
                    message: format!("expected NAME<TAB>UNII, got {line:?}"),
                });
            };
            let uniis: Vec<String> = codes
                .split('|')
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect();
            if uniis.is_empty() || !uniis.iter().all(|u| is_valid_unii(u)) {
                return Err(ResolveError::Format {
                    line: i + 1,
                    message: format!("invalid UNII list {codes:?} for {name:?}"),
                });
            }
            self.insert(name, uniis);
            added += 1;
        }
        Ok(added)
    }

    pub fn load(&mut self, path: &Path) -> Result<usize, ResolveError> {
        let added = self.read(stitchkit_core::open_text(path)?)?;
        log::info!("Loaded {added} overrides from {}", path.display());
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn builtin_seed_is_valid() {
        let overrides = Overrides::builtin();
        assert_eq!(overrides.single("NITROGEN, NF"), Some("N762921K75"));
        assert_eq!(overrides.get("SIMETHICONE").map(<[String]>::len), Some(2));
        assert_eq!(overrides.single("SIMETHICONE"), None);
        for uniis in overrides.map.values() {
            assert!(uniis.iter().all(|u| is_valid_unii(u)));
        }
    }

    #[test]
    fn file_entries_override_seed() {
        let mut overrides = Overrides::builtin();
        let input = "# local fixes\nnitrogen, nf\tAAAAAAAAAA\nMIX\tBBBBBBBBBB|CCCCCCCCCC\n\n";
        assert_eq!(overrides.read(Cursor::new(input)).unwrap(), 2);
        assert_eq!(overrides.single("NITROGEN, NF"), Some("AAAAAAAAAA"));
        assert_eq!(overrides.get("MIX").unwrap(), ["BBBBBBBBBB", "CCCCCCCCCC"]);
    }

    #[test]
    fn bad_code_rejected() {
        let mut overrides = Overrides::default();
        let err = overrides.read(Cursor::new("X\tSHORT\n")).unwrap_err();
        assert!(matches!(err, ResolveError::Format { line: 1, .. }));
    }
}
