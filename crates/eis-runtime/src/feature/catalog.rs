//! The officer feature catalog
//!
//! The set of features is closed: every feature is a `FeatureName` variant
//! with a fixed kind, scope, imputation policy, output columns and SQL
//! builder.

use crate::feature::definition::{QueryBuilder, Scope};
use crate::feature::queries::{self, AGG_ALIAS, CAD_STATS};
use eis_core::{FeatureKind, ImputationPolicy};
use std::fmt;
use std::str::FromStr;

/// Declares the feature enum together with its exhaustive list and wire names
macro_rules! feature_names {
    ($($variant:ident => $name:literal,)+) => {
        /// Every feature the registry can construct
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum FeatureName {
            $($variant,)+
        }

        impl FeatureName {
            /// Every variant, in declaration order
            pub const ALL: &'static [FeatureName] = &[$(FeatureName::$variant,)+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(FeatureName::$variant => $name,)+
                }
            }
        }
    };
}

feature_names! {
    HeightWeight => "height_weight",
    Education => "education",
    MaritalStatus => "marital_status",
    MaleFemale => "male_female",
    Race => "race",
    YearsExperience => "years_experience",
    DaysExperience => "days_experience",
    OfficerAge => "officer_age",
    OfficerAgeAtHire => "officer_age_at_hire",
    CareerArrests => "career_arrests",
    RecentArrests => "recent_arrests",
    CareerNpcArrests => "career_npc_arrests",
    RecentNpcArrests => "recent_npc_arrests",
    CareerDiscArrests => "career_disc_arrests",
    RecentDiscArrests => "recent_disc_arrests",
    DiscOnlyArrests => "disc_only_arrests",
    ArrestTimeOfDay => "arrest_time_of_day",
    ArresteeAge => "arrestee_age",
    ArrestRateDelta => "arrest_rate_delta",
    ArrestCentroids => "arrest_centroids",
    ArrestTimeseries => "arrest_timeseries",
    CareerNpcCitations => "career_npc_citations",
    RecentNpcCitations => "recent_npc_citations",
    CareerCitations => "career_citations",
    RecentCitations => "recent_citations",
    CareerCadStats => "career_cad_stats",
    RecentCadStats => "recent_cad_stats",
    CareerFi => "career_fi",
    RecentFi => "recent_fi",
    CareerNontrafficFi => "career_nontraffic_fi",
    RecentNontrafficFi => "recent_nontraffic_fi",
    CareerHighCrimeFi => "career_high_crime_fi",
    RecentHighCrimeFi => "recent_high_crime_fi",
    CareerLoiterFi => "career_loiter_fi",
    RecentLoiterFi => "recent_loiter_fi",
    CareerBlackFi => "career_black_fi",
    CareerWhiteFi => "career_white_fi",
    FiAvgSuspectAge => "fi_avg_suspect_age",
    FiAvgTimeOfDay => "fi_avg_time_of_day",
    FiTimeseries => "fi_timeseries",
    Suicides => "suicides",
    JuvenileVictims => "juvenile_victims",
    DomesticViolence => "domestic_violence",
    HateIncidents => "hate_incidents",
    NarcoticsIncidents => "narcotics_incidents",
    GangIncidents => "gang_incidents",
    PersonalWeapons => "personal_weapons",
    AvgVictimAge => "avg_victim_age",
    MinVictimAge => "min_victim_age",
}

/// Static definition of one catalog feature
pub(crate) struct CatalogEntry {
    pub description: &'static str,
    pub kind: FeatureKind,
    pub scope: Scope,
    pub imputation: ImputationPolicy,
    /// (query alias, published sub-feature name)
    pub columns: Vec<(&'static str, String)>,
    pub builder: QueryBuilder,
}

impl CatalogEntry {
    fn new(description: &'static str, kind: FeatureKind, scope: Scope, builder: QueryBuilder) -> Self {
        Self {
            description,
            kind,
            scope,
            imputation: ImputationPolicy::None,
            columns: Vec::new(),
            builder,
        }
    }

    fn column(mut self, alias: &'static str, name: &str) -> Self {
        self.columns.push((alias, name.to_string()));
        self
    }

    fn imputed(mut self, policy: ImputationPolicy) -> Self {
        self.imputation = policy;
        self
    }

    /// Officer attribute, imputed by mean
    fn attribute(description: &'static str, kind: FeatureKind, scope: Scope, builder: QueryBuilder) -> Self {
        Self::new(description, kind, scope, builder).imputed(ImputationPolicy::Mean)
    }

    /// Single aggregate column; counts are zero when absent
    fn count(description: &'static str, scope: Scope, name: &str, builder: QueryBuilder) -> Self {
        Self::new(description, FeatureKind::Scalar, scope, builder)
            .column(AGG_ALIAS, name)
            .imputed(ImputationPolicy::Zero)
    }
}

impl FeatureName {
    pub(crate) fn entry(self) -> CatalogEntry {
        use FeatureKind::{Categorical, Scalar, Series};
        use Scope::{AsOf, Career, CareerAndRecent, Recent, Static};

        match self {
            FeatureName::HeightWeight => CatalogEntry::attribute(
                "Officer height and weight, averaged across SI cases up to the reference date",
                Scalar,
                AsOf,
                queries::height_weight,
            )
            .column("avg_weight", "weight")
            .column("avg_height_inches", "height"),
            FeatureName::Education => {
                CatalogEntry::attribute("Officer education level", Categorical, Static, queries::education)
                    .column("education", "education")
            }
            FeatureName::MaritalStatus => CatalogEntry::attribute(
                "Marital status of officer",
                Categorical,
                Static,
                queries::marital_status,
            )
            .column("married", "marital_status"),
            FeatureName::MaleFemale => CatalogEntry::attribute(
                "Is officer male or female",
                Categorical,
                Static,
                queries::male_female,
            )
            .column("male_female", "male_female"),
            FeatureName::Race => CatalogEntry::attribute("Officer race", Categorical, Static, queries::race)
                .column("race", "race"),
            FeatureName::YearsExperience => CatalogEntry::attribute(
                "Number of years of experience for police officer",
                Scalar,
                AsOf,
                queries::years_experience,
            )
            .column("yrs_experience", "years_experience"),
            FeatureName::DaysExperience => CatalogEntry::attribute(
                "Number of days of experience for police officer",
                Scalar,
                AsOf,
                queries::days_experience,
            )
            .column("days_experience", "days_experience"),
            FeatureName::OfficerAge => {
                CatalogEntry::attribute("Officer age", Scalar, AsOf, queries::officer_age).column("age", "age")
            }
            FeatureName::OfficerAgeAtHire => CatalogEntry::attribute(
                "Officer age at hire",
                Scalar,
                Static,
                queries::officer_age_at_hire,
            )
            .column("age_at_hire", "age_at_hire"),

            FeatureName::CareerArrests => CatalogEntry::count(
                "Number of career arrests for officer",
                Career,
                "career_arrest_count",
                queries::arrests,
            ),
            FeatureName::RecentArrests => CatalogEntry::count(
                "Number of recent arrests for officer",
                Recent,
                "recent_arrest_count",
                queries::arrests,
            ),
            FeatureName::CareerNpcArrests => CatalogEntry::count(
                "Number of career NPC arrests for officer",
                Career,
                "career_npc_arrest_count",
                queries::npc_arrests,
            ),
            FeatureName::RecentNpcArrests => CatalogEntry::count(
                "Number of recent NPC arrests for officer",
                Recent,
                "recent_npc_arrest_count",
                queries::npc_arrests,
            ),
            FeatureName::CareerDiscArrests => CatalogEntry::count(
                "Number of career discretionary arrests for officer",
                Career,
                "career_disc_arrest_count",
                queries::disc_arrests,
            ),
            FeatureName::RecentDiscArrests => CatalogEntry::count(
                "Number of recent discretionary arrests for officer",
                Recent,
                "recent_disc_arrest_count",
                queries::disc_arrests,
            ),
            FeatureName::DiscOnlyArrests => CatalogEntry::new(
                "Number of career arrests with only discretionary charges",
                Scalar,
                Career,
                queries::disc_only_arrests,
            )
            .column("disc_only_count", "disc_only_count")
            .imputed(ImputationPolicy::Zero),
            FeatureName::ArrestTimeOfDay => CatalogEntry::count(
                "Average arrest time of day for officer",
                Career,
                "tod_arrest",
                queries::arrest_time_of_day,
            )
            .imputed(ImputationPolicy::Mean),
            FeatureName::ArresteeAge => CatalogEntry::count(
                "Average age of arrestees for officer",
                Career,
                "avg_age_arrestees",
                queries::arrestee_age,
            )
            .imputed(ImputationPolicy::Mean),
            FeatureName::ArrestRateDelta => CatalogEntry::attribute(
                "Recent arrest count relative to career arrest rate",
                Scalar,
                CareerAndRecent,
                queries::arrest_rate_delta,
            )
            .column("career_rate", "career_arrest_rate")
            .column("recent_rate", "recent_arrest_rate")
            .column("rate_delta", "delta_arrest_rate"),
            FeatureName::ArrestCentroids => CatalogEntry::attribute(
                "Sub-beat of the centroid of career arrests",
                Categorical,
                Career,
                queries::arrest_centroids,
            )
            .column("arrest_centroids", "arrest_centroids"),
            FeatureName::ArrestTimeseries => CatalogEntry::attribute(
                "Yearly arrest counts for officer",
                Series,
                Scope::Series,
                queries::arrest_timeseries,
            )
            .column("arrest_timeseries", "timeseries_arrests"),

            FeatureName::CareerNpcCitations => CatalogEntry::count(
                "Number of career NPC citations",
                Career,
                "career_npc_citations_count",
                queries::npc_citations,
            ),
            FeatureName::RecentNpcCitations => CatalogEntry::count(
                "Number of recent NPC citations",
                Recent,
                "recent_npc_citations_count",
                queries::npc_citations,
            ),
            FeatureName::CareerCitations => CatalogEntry::count(
                "Number of career citations",
                Career,
                "career_citations_count",
                queries::citations,
            ),
            FeatureName::RecentCitations => CatalogEntry::count(
                "Number of recent citations",
                Recent,
                "recent_citations_count",
                queries::citations,
            ),

            FeatureName::CareerCadStats => cad_entry("Career CAD statistics", Career, "career"),
            FeatureName::RecentCadStats => cad_entry("Recent CAD statistics", Recent, "recent"),

            FeatureName::CareerFi => CatalogEntry::count(
                "Number of field interviews in career",
                Career,
                "career_fi_count",
                queries::field_interviews,
            ),
            FeatureName::RecentFi => CatalogEntry::count(
                "Number of field interviews in last year",
                Recent,
                "recent_fi_count",
                queries::field_interviews,
            ),
            FeatureName::CareerNontrafficFi => CatalogEntry::count(
                "Number of non-traffic field interviews in career",
                Career,
                "career_fi_nontraffic_count",
                queries::nontraffic_fi,
            ),
            FeatureName::RecentNontrafficFi => CatalogEntry::count(
                "Number of non-traffic field interviews in last year",
                Recent,
                "recent_fi_nontraffic_count",
                queries::nontraffic_fi,
            ),
            FeatureName::CareerHighCrimeFi => CatalogEntry::count(
                "Number of field interviews in career in high crime area",
                Career,
                "career_fi_highcrime_count",
                queries::high_crime_fi,
            ),
            FeatureName::RecentHighCrimeFi => CatalogEntry::count(
                "Number of field interviews in last year in high crime area",
                Recent,
                "recent_fi_highcrime_count",
                queries::high_crime_fi,
            ),
            FeatureName::CareerLoiterFi => CatalogEntry::count(
                "Number of field interviews of loiterers in career",
                Career,
                "career_fi_loiter_count",
                queries::loiter_fi,
            ),
            FeatureName::RecentLoiterFi => CatalogEntry::count(
                "Number of field interviews of loiterers in last year",
                Recent,
                "recent_fi_loiter_count",
                queries::loiter_fi,
            ),
            FeatureName::CareerBlackFi => CatalogEntry::count(
                "Fraction of field interviews where the suspect is black",
                Career,
                "career_frac_black_suspects",
                queries::black_fi,
            ),
            FeatureName::CareerWhiteFi => CatalogEntry::count(
                "Fraction of field interviews where the suspect is white",
                Career,
                "career_frac_white_suspects",
                queries::white_fi,
            ),
            FeatureName::FiAvgSuspectAge => CatalogEntry::count(
                "Average age of suspects in field interviews",
                Career,
                "avg_age_suspects_fi",
                queries::fi_avg_suspect_age,
            ),
            FeatureName::FiAvgTimeOfDay => CatalogEntry::count(
                "Average time of day for field interviews",
                Career,
                "avg_tod_fi",
                queries::fi_avg_time_of_day,
            ),
            FeatureName::FiTimeseries => CatalogEntry::attribute(
                "Yearly field interview counts for officer",
                Series,
                Scope::Series,
                queries::fi_timeseries,
            )
            .column("fi_timeseries", "fi_timeseries"),

            FeatureName::Suicides => CatalogEntry::count(
                "Number of suicides in last year",
                Recent,
                "suicides_count",
                queries::suicides,
            ),
            FeatureName::JuvenileVictims => CatalogEntry::count(
                "Number of juvenile victims in last year",
                Recent,
                "juvenile_count",
                queries::juvenile_victims,
            ),
            FeatureName::DomesticViolence => CatalogEntry::count(
                "Number of domestic violence incidents in last year",
                Recent,
                "domestic_violence_count",
                queries::domestic_violence,
            ),
            FeatureName::HateIncidents => CatalogEntry::count(
                "Number of hate incidents in last year",
                Recent,
                "hate_count",
                queries::hate_incidents,
            ),
            FeatureName::NarcoticsIncidents => CatalogEntry::count(
                "Number of narcotics incidents in last year",
                Recent,
                "narcotics_count",
                queries::narcotics_incidents,
            ),
            FeatureName::GangIncidents => CatalogEntry::count(
                "Number of gang incidents in last year",
                Recent,
                "gang_count",
                queries::gang_incidents,
            ),
            FeatureName::PersonalWeapons => CatalogEntry::count(
                "Number of personal weapons incidents in last year",
                Recent,
                "personal_weapon_count",
                queries::personal_weapons,
            ),
            FeatureName::AvgVictimAge => CatalogEntry::count(
                "Average age of victims in last year",
                Recent,
                "avg_victim_age",
                queries::avg_victim_age,
            ),
            FeatureName::MinVictimAge => CatalogEntry::count(
                "Minimum age of victims in last year",
                Recent,
                "min_victim_age",
                queries::min_victim_age,
            ),
        }
    }
}

fn cad_entry(description: &'static str, scope: Scope, prefix: &str) -> CatalogEntry {
    CAD_STATS.into_iter().fold(
        CatalogEntry::attribute(description, FeatureKind::Scalar, scope, queries::cad_stats),
        |entry, stat| entry.column(stat, &format!("{}_{}", prefix, stat)),
    )
}

impl fmt::Display for FeatureName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeatureName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FeatureName::ALL
            .iter()
            .copied()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}
