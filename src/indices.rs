// 🇮🇳 NSE Index Membership - Static configuration tables
// NIFTY 50 / 51-100 / 101-150 / 151-250 constituent symbols

/// NIFTY 50 constituents (NSE symbols)
pub const NIFTY_50: &[&str] = &[
    "ADANIENT.NS", "ADANIPORTS.NS", "APOLLOHOSP.NS", "ASIANPAINT.NS", "AXISBANK.NS",
    "BAJAJ-AUTO.NS", "BAJFINANCE.NS", "BAJAJFINSV.NS", "BPCL.NS", "BHARTIARTL.NS",
    "BRITANNIA.NS", "CIPLA.NS", "COALINDIA.NS", "DIVISLAB.NS", "DRREDDY.NS",
    "EICHERMOT.NS", "GRASIM.NS", "HCLTECH.NS", "HDFCBANK.NS", "HDFCLIFE.NS",
    "HEROMOTOCO.NS", "HINDALCO.NS", "HINDUNILVR.NS", "ICICIBANK.NS", "ITC.NS",
    "INDUSINDBK.NS", "INFY.NS", "JSWSTEEL.NS", "KOTAKBANK.NS", "LT.NS",
    "M&M.NS", "MARUTI.NS", "NTPC.NS", "ONGC.NS", "POWERGRID.NS",
    "RELIANCE.NS", "SBIN.NS", "SUNPHARMA.NS", "TCS.NS", "TATACONSUM.NS",
    "TATAMOTORS.NS", "TATASTEEL.NS", "TECHM.NS", "TITAN.NS", "ULTRACEMCO.NS",
    "UPL.NS", "WIPRO.NS",
];

/// NIFTY Next 50 (ranks 51-100)
pub const NIFTY_NEXT_50: &[&str] = &[
    "ABB.NS", "ACC.NS", "ADANIGREEN.NS", "ADANITRANS.NS", "AMBUJACEM.NS",
    "AUBANK.NS", "BANDHANBNK.NS", "BERGEPAINT.NS", "BOSCHLTD.NS", "CANBK.NS",
    "CHOLAFIN.NS", "COLPAL.NS", "DLF.NS", "GAIL.NS", "GODREJCP.NS",
    "HAVELLS.NS", "ICICIPRULI.NS", "IGL.NS", "INDIGO.NS", "JINDALSTEL.NS",
    "LICHSGFIN.NS", "LUPIN.NS", "MARICO.NS", "MOTHERSUMI.NS", "NMDC.NS",
    "OFSS.NS", "PAGEIND.NS", "PETRONET.NS", "PIDILITIND.NS", "PNB.NS",
    "SIEMENS.NS", "SRF.NS", "TORNTPHARM.NS", "TVSMOTOR.NS", "UBL.NS",
    "VEDL.NS", "VOLTAS.NS", "ZEEL.NS",
];

/// NIFTY ranks 101-150
pub const NIFTY_101_150: &[&str] = &[
    "ABFRL.NS", "ALKEM.NS", "ASHOKLEY.NS", "ASTRAL.NS", "ATUL.NS",
    "AUROPHARMA.NS", "BATAINDIA.NS", "BEL.NS", "BHARATFORG.NS", "BIRLACORPN.NS",
    "CESC.NS", "COFORGE.NS", "COROMANDEL.NS", "CROMPTON.NS", "DEEPAKNTR.NS",
    "ESCORTS.NS", "EXIDEIND.NS", "FEDERALBNK.NS", "GLENMARK.NS", "GNFC.NS",
    "HDFCAMC.NS", "IDFCFIRSTB.NS", "IPCALAB.NS", "IRCTC.NS", "JUBLFOOD.NS",
    "KANSAINER.NS", "LALPATHLAB.NS", "LTTS.NS", "MFSL.NS", "MPHASIS.NS",
    "NAM-INDIA.NS", "OBEROIRLTY.NS", "POLYCAB.NS", "PRESTIGE.NS", "RAMCOCEM.NS",
    "SAIL.NS", "SUNTV.NS", "TRENT.NS", "UNITDSPR.NS", "ZYDUSLIFE.NS",
];

/// NIFTY ranks 151-250
pub const NIFTY_151_250: &[&str] = &[
    "AARTIIND.NS", "ABBOTINDIA.NS", "ACE.NS", "ADANIPOWER.NS", "AFFLE.NS",
    "AJANTPHARM.NS", "ALKYLAMINE.NS", "AMARAJABAT.NS", "ANGELONE.NS", "APARINDS.NS",
    "APLLTD.NS", "BALAMINES.NS", "BALKRISIND.NS", "BASF.NS", "BAYERCROP.NS",
    "BDL.NS", "BSOFT.NS", "CAMS.NS", "CANFINHOME.NS", "CARBORUNIV.NS",
    "CDSL.NS", "CENTRALBK.NS", "CERA.NS", "CHALET.NS", "CLEAN.NS",
    "CONCOR.NS", "CREDITACC.NS", "CYIENT.NS", "DATAPATTNS.NS", "DCMSHRIRAM.NS",
    "DELTACORP.NS", "DEVYANI.NS", "DIXON.NS", "EASEMYTRIP.NS", "ELGIEQUIP.NS",
    "ENDURANCE.NS", "EQUITASBNK.NS", "FINEORG.NS", "FORTIS.NS", "FSL.NS",
    "GESHIP.NS", "GILLETTE.NS", "GMMPFAUDLR.NS", "GRANULES.NS", "GUJGASLTD.NS",
    "HAL.NS", "HAPPSTMNDS.NS", "HFCL.NS", "IEX.NS", "INDIAMART.NS",
    "INTELLECT.NS", "IRB.NS", "IRFC.NS", "JBCHEPHARM.NS", "JSL.NS",
    "KEC.NS", "KEI.NS", "KPITTECH.NS", "LAXMIMACH.NS", "MAHLOG.NS",
    "MAHSCOOTER.NS", "MCX.NS", "METROPOLIS.NS", "MGL.NS", "NATCOPHARM.NS",
    "NAVINFLUOR.NS", "NBCC.NS", "NESCO.NS", "NIITLTD.NS", "NUVOCO.NS",
    "PFIZER.NS", "PERSISTENT.NS", "POLYMED.NS", "RAIN.NS", "RBLBANK.NS",
    "RECLTD.NS", "REDINGTON.NS", "ROUTE.NS", "SANOFI.NS", "SCHAEFFLER.NS",
    "SONATSOFTW.NS", "SPANDANA.NS", "STAR.NS", "SUNDRMFAST.NS", "SUPREMEIND.NS",
    "SYNGENE.NS", "TATAELXSI.NS", "TATACHEM.NS", "TATAPOWER.NS", "TCIEXP.NS",
    "THERMAX.NS", "TIINDIA.NS", "TORNTPOWER.NS", "TRIDENT.NS", "UCOBANK.NS",
    "UNIONBANK.NS", "VINATIORGA.NS", "WHIRLPOOL.NS", "ZENSARTECH.NS",
];

// ============================================================================
// INDEX SELECTION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NseIndex {
    Nifty50,
    NiftyNext50,
    Nifty101To150,
    Nifty151To250,
}

impl NseIndex {
    pub const ALL: [NseIndex; 4] = [
        NseIndex::Nifty50,
        NseIndex::NiftyNext50,
        NseIndex::Nifty101To150,
        NseIndex::Nifty151To250,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            NseIndex::Nifty50 => "NIFTY 50",
            NseIndex::NiftyNext50 => "NIFTY 51-100",
            NseIndex::Nifty101To150 => "NIFTY 101-150",
            NseIndex::Nifty151To250 => "NIFTY 151-250",
        }
    }

    pub fn symbols(&self) -> &'static [&'static str] {
        match self {
            NseIndex::Nifty50 => NIFTY_50,
            NseIndex::NiftyNext50 => NIFTY_NEXT_50,
            NseIndex::Nifty101To150 => NIFTY_101_150,
            NseIndex::Nifty151To250 => NIFTY_151_250,
        }
    }

    pub fn from_name(name: &str) -> Option<NseIndex> {
        let normalized = name.trim().to_lowercase();
        match normalized.as_str() {
            "nifty 50" | "nifty50" => Some(NseIndex::Nifty50),
            "nifty 51-100" | "nifty next 50" | "niftynext50" => Some(NseIndex::NiftyNext50),
            "nifty 101-150" => Some(NseIndex::Nifty101To150),
            "nifty 151-250" => Some(NseIndex::Nifty151To250),
            _ => None,
        }
    }

    /// Membership test for one symbol.
    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols().contains(&symbol)
    }

    /// Which index a symbol belongs to, if any.
    pub fn containing(symbol: &str) -> Option<NseIndex> {
        NseIndex::ALL.into_iter().find(|idx| idx.contains(symbol))
    }
}

/// Presentation name for an NSE symbol ("RELIANCE.NS" → "RELIANCE").
pub fn display_symbol(symbol: &str) -> &str {
    symbol.strip_suffix(".NS").unwrap_or(symbol)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_sizes() {
        assert_eq!(NseIndex::Nifty50.symbols().len(), 47);
        assert_eq!(NseIndex::NiftyNext50.symbols().len(), 38);
        assert_eq!(NseIndex::Nifty101To150.symbols().len(), 40);
        assert_eq!(NseIndex::Nifty151To250.symbols().len(), 99);
    }

    #[test]
    fn test_no_overlap_between_indices() {
        use std::collections::HashSet;

        let mut seen = HashSet::new();
        for idx in NseIndex::ALL {
            for symbol in idx.symbols() {
                assert!(seen.insert(*symbol), "duplicate symbol across indices: {}", symbol);
            }
        }
    }

    #[test]
    fn test_from_name() {
        assert_eq!(NseIndex::from_name("NIFTY 50"), Some(NseIndex::Nifty50));
        assert_eq!(NseIndex::from_name("nifty 101-150"), Some(NseIndex::Nifty101To150));
        assert_eq!(NseIndex::from_name("NIFTY 500"), None);
    }

    #[test]
    fn test_contains() {
        assert!(NseIndex::Nifty50.contains("RELIANCE.NS"));
        assert!(NseIndex::Nifty50.contains("M&M.NS"));
        assert!(!NseIndex::Nifty50.contains("DIXON.NS"));
        assert!(NseIndex::Nifty151To250.contains("DIXON.NS"));
    }

    #[test]
    fn test_containing() {
        assert_eq!(NseIndex::containing("RELIANCE.NS"), Some(NseIndex::Nifty50));
        assert_eq!(NseIndex::containing("DIXON.NS"), Some(NseIndex::Nifty151To250));
        assert_eq!(NseIndex::containing("NOTLISTED.NS"), None);
    }

    #[test]
    fn test_display_symbol() {
        assert_eq!(display_symbol("RELIANCE.NS"), "RELIANCE");
        assert_eq!(display_symbol("M&M.NS"), "M&M");
        assert_eq!(display_symbol("BRK-B"), "BRK-B");
    }
}
