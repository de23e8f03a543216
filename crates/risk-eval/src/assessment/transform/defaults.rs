/// Model input that may lack a direct form value. A key with proxies always takes the
/// first usable proxy and ignores its own value; a key without proxies reads itself.
/// 0 when nothing is usable.
pub(crate) struct DerivedDefault {
    pub key: &'static str,
    pub proxies: &'static [&'static str],
}

const fn own(key: &'static str) -> DerivedDefault {
    DerivedDefault { key, proxies: &[] }
}

pub(crate) static DERIVED_DEFAULTS: [DerivedDefault; 15] = [
    own("num_dbt"),
    own("num_dbt_12mts"),
    own("num_lss"),
    own("num_lss_12mts"),
    DerivedDefault {
        key: "recent_level_of_deliq",
        proxies: &["max_recent_level_of_deliq"],
    },
    own("CC_enq_L12m"),
    own("PL_enq_L12m"),
    own("time_since_recent_enq"),
    own("enq_L3m"),
    own("NETMONTHLYINCOME"),
    own("Time_With_Curr_Empr"),
    own("pct_currentBal_all_TL"),
    own("CC_Flag"),
    own("num_sub_6mts"),
    own("num_sub_12mts"),
];

impl DerivedDefault {
    pub fn sources(&self) -> impl Iterator<Item = &'static str> {
        let own = self.proxies.is_empty().then_some(self.key);
        own.into_iter().chain(self.proxies.iter().copied())
    }
}
