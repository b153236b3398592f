//! SQL builders for the officer feature catalog
//!
//! Every builder renders read-only SQL selecting the entity id column plus
//! the aliases declared for the feature in the catalog. Event tables are
//! always filtered through [`QueryBounds`], never by hand. Rows always come
//! back ordered by entity id, then by the value columns where an entity can
//! have several rows, so the first-row-wins dedupe and the order categories
//! are first seen in do not depend on scan order.

use crate::feature::definition::QueryBounds;
use crate::feature::tables::TableConfig;

const DISC_CHARGES: [&str; 4] = ["DISORDERLY", "OBSTRUCT", "RESIST", "DELAY"];

const LOITER_TERMS: [&str; 4] = ["loiter", "sleep", "sitting", "walk"];

// Column stems of the CAD statistics, in output order
pub(crate) const CAD_STATS: [&str; 11] = [
    "avg_seq_assgn",
    "avg_diff_arrv_assgn",
    "avg_travel_time",
    "std_travel_time",
    "avg_response_time",
    "avg_scene_time",
    "avg_prior_orig",
    "std_prior_orig",
    "avg_prior_fin",
    "std_prior_fin",
    "priority_diff",
];

/// Alias of the single aggregate column produced by [`entity_aggregate`]
pub(crate) const AGG_ALIAS: &str = "agg_value";

fn any_like(column: &str, terms: &[&str]) -> String {
    let parts: Vec<String> = terms
        .iter()
        .map(|t| format!("{} like '%{}%'", column, t))
        .collect();
    format!("({})", parts.join(" or "))
}

fn none_like(column: &str, terms: &[&str]) -> String {
    let parts: Vec<String> = terms
        .iter()
        .map(|t| format!("{} not like '%{}%'", column, t))
        .collect();
    parts.join(" and ")
}

/// `agg_expr` per entity over `table`, filtered by `condition` and the window
fn entity_aggregate(
    t: &TableConfig,
    b: &QueryBounds,
    table: &str,
    date_column: &str,
    condition: Option<&str>,
    agg_expr: &str,
) -> String {
    let filter = match condition {
        Some(cond) => format!("{} and {}", cond, b.within(date_column)),
        None => b.within(date_column),
    };
    format!(
        "select {id}, {agg} as {alias} from {table} where {filter} group by {id} order by {id}",
        id = t.id_column,
        agg = agg_expr,
        alias = AGG_ALIAS,
        table = table,
        filter = filter,
    )
}

/// Per-year event counts with zero-filled years, aggregated into an array.
///
/// Every entity seen up to the reference date is crossed with every calendar
/// year of the window, so years without events still occupy a slot.
fn yearly_series(
    t: &TableConfig,
    b: &QueryBounds,
    table: &str,
    date_column: &str,
    count_expr: &str,
    alias: &str,
) -> String {
    format!(
        "select {id}, array_agg(intervals_count order by intervalid) as {alias} \
         from (select a.{id}, a.intervalid, coalesce(c.event_count, 0) as intervals_count \
         from (select e.{id}, s.intervals, s.intervalid \
         from (select distinct {id} from {table} where {upto}) as e \
         cross join (select intervals, row_number() over (order by intervals) as intervalid \
         from (select distinct date_trunc('year', d) as intervals \
         from generate_series('{start}'::timestamp, '{end}'::timestamp, '1 day') as d) as g) as s) as a \
         left join (select {id}, date_trunc('year', {date}) as intervals, {count}::int as event_count \
         from {table} where {within} group by {id}, date_trunc('year', {date})) as c \
         on a.{id} = c.{id} and a.intervals = c.intervals) as slots \
         group by {id} order by {id}",
        id = t.id_column,
        alias = alias,
        table = table,
        upto = b.upto(date_column),
        start = b.start_or_reference(),
        end = b.reference_date,
        date = date_column,
        count = count_expr,
        within = b.within(date_column),
    )
}

// Officer attributes

/// Averages over SI cases that occurred up to the reference date
pub(crate) fn height_weight(t: &TableConfig, b: &QueryBounds) -> String {
    format!(
        "select {id}, avg(weight_int) as avg_weight, avg(height_inches_int) as avg_height_inches \
         from {si} where {upto} group by {id} order by {id}",
        id = t.id_column,
        si = t.si_table,
        upto = b.upto("dateoccured"),
    )
}

fn officer_column(t: &TableConfig, expr: &str, alias: &str) -> String {
    officer_column_where(t, expr, alias, None)
}

// The officer table may hold several rows per officer
fn officer_column_where(
    t: &TableConfig,
    expr: &str,
    alias: &str,
    filter: Option<String>,
) -> String {
    let filter = filter.map(|f| format!(" where {}", f)).unwrap_or_default();
    format!(
        "select {id}, {expr} as {alias} from {table}{filter} order by {id}, {alias}",
        id = t.id_column,
        expr = expr,
        alias = alias,
        table = t.officer_table,
        filter = filter,
    )
}

pub(crate) fn education(t: &TableConfig, _b: &QueryBounds) -> String {
    officer_column(t, "education_level_cleaned", "education")
}

pub(crate) fn marital_status(t: &TableConfig, _b: &QueryBounds) -> String {
    officer_column(t, "marital_status", "married")
}

pub(crate) fn male_female(t: &TableConfig, _b: &QueryBounds) -> String {
    officer_column(t, "empl_sex_clean", "male_female")
}

pub(crate) fn race(t: &TableConfig, _b: &QueryBounds) -> String {
    officer_column(t, "empl_race_cleaned", "race")
}

pub(crate) fn officer_age_at_hire(t: &TableConfig, _b: &QueryBounds) -> String {
    officer_column(
        t,
        "extract(year from hire_date_employed) - birthdate_year",
        "age_at_hire",
    )
}

fn hired_by(t: &TableConfig, b: &QueryBounds, expr: &str, alias: &str) -> String {
    officer_column_where(t, expr, alias, Some(b.upto("hire_date_employed")))
}

pub(crate) fn years_experience(t: &TableConfig, b: &QueryBounds) -> String {
    let expr = format!("{} - extract(year from hire_date_employed)", b.year());
    hired_by(t, b, &expr, "yrs_experience")
}

pub(crate) fn days_experience(t: &TableConfig, b: &QueryBounds) -> String {
    let expr = format!("'{}'::date - hire_date_employed::date", b.reference_date);
    hired_by(t, b, &expr, "days_experience")
}

pub(crate) fn officer_age(t: &TableConfig, b: &QueryBounds) -> String {
    officer_column(t, &format!("{} - birthdate_year", b.year()), "age")
}

// Arrests

pub(crate) fn arrests(t: &TableConfig, b: &QueryBounds) -> String {
    entity_aggregate(t, b, &t.arrest_charges_table, "arrest_date", None, "count(distinct aa_id)")
}

pub(crate) fn npc_arrests(t: &TableConfig, b: &QueryBounds) -> String {
    entity_aggregate(
        t,
        b,
        &t.arrest_charges_table,
        "arrest_date",
        Some("magistrate_action_mlov = 'MA03'"),
        "count(distinct aa_id)",
    )
}

/// Arrests whose only charge is a discretionary one
pub(crate) fn disc_arrests(t: &TableConfig, b: &QueryBounds) -> String {
    format!(
        "select {id}, count(*) as agg_value from (select {id}, count(*) as c, \
         string_agg(charge_desc::text, '    ') as charges from {table} \
         where charge_desc is not null and {within} group by {id}, aa_id) as a \
         where c = 1 and charges similar to '%({alts})%' group by {id} order by {id}",
        id = t.id_column,
        table = t.arrest_charges_table,
        within = b.within("arrest_date"),
        alts = DISC_CHARGES.join("|"),
    )
}

/// Arrests with discretionary charges and no other charge at all
pub(crate) fn disc_only_arrests(t: &TableConfig, b: &QueryBounds) -> String {
    format!(
        "select {id}, count(distinct aa_id) as disc_only_count from (select a.{id}, a.aa_id, \
         o.aa_id as other_id from (select aa_id, {id} from {table} where {disc} and {upto}) as a \
         left join (select aa_id from {table} where {not_disc} and {upto}) as o \
         on a.aa_id = o.aa_id) as foo where other_id is null group by {id} order by {id}",
        id = t.id_column,
        table = t.arrest_charges_table,
        disc = any_like("charge_desc", &DISC_CHARGES),
        not_disc = none_like("charge_desc", &DISC_CHARGES),
        upto = b.upto("arrest_date"),
    )
}

pub(crate) fn arrest_time_of_day(t: &TableConfig, b: &QueryBounds) -> String {
    entity_aggregate(
        t,
        b,
        &t.arrest_charges_table,
        "arrest_date",
        None,
        "avg(extract(hour from arrest_date))",
    )
}

pub(crate) fn arrestee_age(t: &TableConfig, b: &QueryBounds) -> String {
    entity_aggregate(t, b, &t.arrest_charges_table, "arrest_date", None, "avg(age)")
}

/// Career arrest rate (per year of service), recent count and their ratio
pub(crate) fn arrest_rate_delta(t: &TableConfig, b: &QueryBounds) -> String {
    let career = QueryBounds::new(b.reference_date, None);
    format!(
        "select a.{id}, a.career_rate, r.recent_rate, r.recent_rate / nullif(a.career_rate, 0) \
         as rate_delta from (select c.{id}, c.career_count / (extract(year from \
         least(coalesce(o.terminationdate, '{end}'::date), '{end}'::date)) \
         - extract(year from o.hire_date) + 2) as career_rate \
         from (select {id}, count(distinct aa_id) as career_count from {arrests} \
         where {career} group by {id}) as c \
         left join {officers} as o on c.{id} = o.{id}) as a \
         left join (select {id}, count(distinct aa_id) as recent_rate from {arrests} \
         where {recent} group by {id}) as r on a.{id} = r.{id} order by a.{id}, a.career_rate",
        id = t.id_column,
        end = b.reference_date,
        arrests = t.arrest_charges_table,
        officers = t.officer_table,
        career = career.upto("arrest_date"),
        recent = b.within("arrest_date"),
    )
}

/// Sub-beat containing the centroid of the officer's arrest locations
pub(crate) fn arrest_centroids(t: &TableConfig, b: &QueryBounds) -> String {
    format!(
        "select a.{id}, s.subbeat as arrest_centroids from (select {id}, \
         st_setsrid(st_makepoint(avg(long), avg(lat)), 4326) as point \
         from (select distinct on (aa_id) aa_id, {id}, lat, long from {arrests} \
         where {upto} order by aa_id) as foo group by {id}) as a \
         left join {beats} as s on st_contains(s.geom2::geometry, a.point::geometry) \
         order by a.{id}, s.subbeat",
        id = t.id_column,
        arrests = t.arrest_charges_table,
        upto = b.upto("arrest_date"),
        beats = t.sub_beats,
    )
}

pub(crate) fn arrest_timeseries(t: &TableConfig, b: &QueryBounds) -> String {
    yearly_series(
        t,
        b,
        &t.arrest_charges_table,
        "arrest_date",
        "count(distinct aa_id)",
        "arrest_timeseries",
    )
}

// Citations

pub(crate) fn npc_citations(t: &TableConfig, b: &QueryBounds) -> String {
    entity_aggregate(t, b, &t.citations_table, "datet", Some("type = 'NPC'"), "count(*)")
}

pub(crate) fn citations(t: &TableConfig, b: &QueryBounds) -> String {
    entity_aggregate(t, b, &t.citations_table, "datet", None, "count(*)")
}

// CAD

pub(crate) fn cad_stats(t: &TableConfig, b: &QueryBounds) -> String {
    let exprs = [
        "avg(seq_assigned)",
        "avg(seq_arrived - seq_assigned)",
        "avg(travel_time)",
        "stddev(travel_time)",
        "avg(response_time)",
        "log(avg(at_scene_time) + 1)",
        "avg(priority_org::int)",
        "stddev(priority_org::int)",
        "avg(priority_fin::int)",
        "stddev(priority_fin::int)",
        "avg(priority_org::int - priority_fin::int)",
    ];
    let selects: Vec<String> = exprs
        .iter()
        .zip(CAD_STATS.iter())
        .map(|(expr, alias)| format!("{} as {}", expr, alias))
        .collect();
    format!(
        "select {id}, {selects} from {table} where {within} group by {id} order by {id}",
        id = t.id_column,
        selects = selects.join(", "),
        table = t.dispatch_table,
        within = b.within("date_add"),
    )
}

// Field interviews

const FI_DATE: &str = "corrected_interview_date";

pub(crate) fn field_interviews(t: &TableConfig, b: &QueryBounds) -> String {
    entity_aggregate(t, b, &t.field_int_table, FI_DATE, None, "count(*)")
}

pub(crate) fn nontraffic_fi(t: &TableConfig, b: &QueryBounds) -> String {
    entity_aggregate(t, b, &t.field_int_table, FI_DATE, Some("traffic_stop_yn = 'N'"), "count(*)")
}

pub(crate) fn high_crime_fi(t: &TableConfig, b: &QueryBounds) -> String {
    entity_aggregate(
        t,
        b,
        &t.field_int_table,
        FI_DATE,
        Some("narrative like '%high crime area%'"),
        "count(*)",
    )
}

pub(crate) fn loiter_fi(t: &TableConfig, b: &QueryBounds) -> String {
    let condition = format!(
        "{} and narrative not like '%call for service%'",
        any_like("narrative", &LOITER_TERMS)
    );
    entity_aggregate(t, b, &t.field_int_table, FI_DATE, Some(&condition), "count(*)")
}

fn suspect_race_share(t: &TableConfig, b: &QueryBounds, race_code: &str) -> String {
    let expr = format!(
        "sum(case when rac_code = '{}' then 1 else 0 end)::float / (count(*) + 1)",
        race_code
    );
    entity_aggregate(t, b, &t.field_int_table, FI_DATE, None, &expr)
}

pub(crate) fn black_fi(t: &TableConfig, b: &QueryBounds) -> String {
    suspect_race_share(t, b, "B")
}

pub(crate) fn white_fi(t: &TableConfig, b: &QueryBounds) -> String {
    suspect_race_share(t, b, "W")
}

pub(crate) fn fi_avg_suspect_age(t: &TableConfig, b: &QueryBounds) -> String {
    entity_aggregate(t, b, &t.field_int_table, FI_DATE, None, "avg(age)")
}

pub(crate) fn fi_avg_time_of_day(t: &TableConfig, b: &QueryBounds) -> String {
    entity_aggregate(
        t,
        b,
        &t.field_int_table,
        FI_DATE,
        None,
        "avg(extract(hour from corrected_interview_date))",
    )
}

pub(crate) fn fi_timeseries(t: &TableConfig, b: &QueryBounds) -> String {
    yearly_series(t, b, &t.field_int_table, FI_DATE, "count(*)", "fi_timeseries")
}

// Incidents

const INCIDENT_DATE: &str = "date_incident_began";

fn incidents_where(t: &TableConfig, b: &QueryBounds, condition: &str) -> String {
    entity_aggregate(
        t,
        b,
        &t.incidents_table,
        INCIDENT_DATE,
        Some(condition),
        "count(distinct inc_id)",
    )
}

pub(crate) fn suicides(t: &TableConfig, b: &QueryBounds) -> String {
    incidents_where(t, b, "ucr_desc = 'Suicide'")
}

pub(crate) fn juvenile_victims(t: &TableConfig, b: &QueryBounds) -> String {
    incidents_where(t, b, "victim1_age_int < 16")
}

pub(crate) fn domestic_violence(t: &TableConfig, b: &QueryBounds) -> String {
    incidents_where(t, b, "domestic_violence_flag = 'Y'")
}

pub(crate) fn hate_incidents(t: &TableConfig, b: &QueryBounds) -> String {
    incidents_where(t, b, "bias_hate_flag = 'Y'")
}

pub(crate) fn narcotics_incidents(t: &TableConfig, b: &QueryBounds) -> String {
    incidents_where(t, b, "narcotics_flag = 'Y'")
}

pub(crate) fn gang_incidents(t: &TableConfig, b: &QueryBounds) -> String {
    incidents_where(t, b, "gang_flag = 'Y'")
}

pub(crate) fn personal_weapons(t: &TableConfig, b: &QueryBounds) -> String {
    incidents_where(t, b, "weapon_type_code = 'G'")
}

pub(crate) fn avg_victim_age(t: &TableConfig, b: &QueryBounds) -> String {
    entity_aggregate(
        t,
        b,
        &t.incidents_table,
        INCIDENT_DATE,
        None,
        "avg(cast(victim1_age as float))",
    )
}

pub(crate) fn min_victim_age(t: &TableConfig, b: &QueryBounds) -> String {
    entity_aggregate(
        t,
        b,
        &t.incidents_table,
        INCIDENT_DATE,
        None,
        "min(cast(victim1_age as float))",
    )
}
