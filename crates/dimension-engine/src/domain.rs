//! Domain accessors: the abstraction over the three backing-store
//! shapes a dimension domain can live in.
//!
//! One interface, three implementations, selected once per layer at
//! setup time: a vector attribute source, a structured granule catalog,
//! and a flat grid reader that only exposes a pre-sorted summary
//! domain. The engine never branches on the concrete shape per call; it
//! only asks once whether filter pushdown is available.

use std::collections::BTreeMap;

use dimension_common::{
    DimensionError, DimensionResult, DimensionValue, DomainSample, Filter,
};

/// Read-only queries over one dimension's domain.
///
/// Implementations back onto external stores; I/O failures surface as
/// [`DimensionError::DomainUnavailable`].
pub trait DimensionDomainAccessor {
    /// Whether comparison predicates can be pushed down to the store.
    /// Accessors answering `false` are served through the
    /// [`full_sorted_domain`](Self::full_sorted_domain) fallback.
    fn supports_filter_pushdown(&self) -> bool {
        true
    }

    /// Minimum of `attribute` over records matching `filter`.
    fn min_of(
        &self,
        attribute: &str,
        filter: Option<&Filter>,
    ) -> DimensionResult<Option<DimensionValue>>;

    /// Maximum of `attribute` over records matching `filter`.
    fn max_of(
        &self,
        attribute: &str,
        filter: Option<&Filter>,
    ) -> DimensionResult<Option<DimensionValue>>;

    /// Distinct values of `attribute` over records matching `filter`.
    fn unique_values(
        &self,
        attribute: &str,
        filter: Option<&Filter>,
    ) -> DimensionResult<Vec<DimensionValue>>;

    /// Matching domain samples, ordered by their start bound. Without a
    /// hint the order is ascending.
    fn fetch(
        &self,
        filter: &Filter,
        sort: Option<SortHint>,
    ) -> DimensionResult<Vec<DomainSample>>;

    /// The entire domain, sorted ascending. Fallback path for accessors
    /// without filter pushdown.
    fn full_sorted_domain(&self) -> DimensionResult<Vec<DomainSample>>;
}

/// Requested ordering of fetched domain samples, by start bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortHint {
    Ascending,
    Descending,
}

/// One record of a vector source or granule catalog: attribute name to
/// typed value.
pub type DomainRecord = BTreeMap<String, DimensionValue>;

fn record_lookup(record: &DomainRecord) -> impl Fn(&str) -> Option<DimensionValue> + '_ {
    move |attr: &str| record.get(attr).cloned()
}

fn sort_samples(samples: &mut [DomainSample]) {
    samples.sort_by(|a, b| {
        a.start()
            .partial_cmp(b.start())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

fn aggregate(
    values: impl Iterator<Item = DimensionValue>,
    want_max: bool,
) -> Option<DimensionValue> {
    let mut best: Option<DimensionValue> = None;
    for v in values {
        best = match best {
            None => Some(v),
            Some(b) => match v.partial_cmp(&b) {
                Some(std::cmp::Ordering::Greater) if want_max => Some(v),
                Some(std::cmp::Ordering::Less) if !want_max => Some(v),
                _ => Some(b),
            },
        };
    }
    best
}

/// Vector attribute source: a table of records with per-feature
/// dimension attributes. Supports full filter pushdown.
#[derive(Debug, Clone)]
pub struct VectorSource {
    attribute: String,
    end_attribute: Option<String>,
    records: Vec<DomainRecord>,
}

impl VectorSource {
    pub fn new(
        attribute: impl Into<String>,
        end_attribute: Option<String>,
        records: Vec<DomainRecord>,
    ) -> Self {
        Self {
            attribute: attribute.into(),
            end_attribute,
            records,
        }
    }

    fn matching<'a>(&'a self, filter: Option<&'a Filter>) -> impl Iterator<Item = &'a DomainRecord> {
        self.records
            .iter()
            .filter(move |r| match filter {
                Some(f) => f.evaluate(&record_lookup(r)),
                None => true,
            })
    }

    fn sample_of(&self, record: &DomainRecord) -> Option<DomainSample> {
        let start = record.get(&self.attribute)?.clone();
        match &self.end_attribute {
            Some(end_attr) => {
                let end = record.get(end_attr)?.clone();
                Some(DomainSample::Interval { start, end })
            }
            None => Some(DomainSample::Value(start)),
        }
    }
}

impl DimensionDomainAccessor for VectorSource {
    fn min_of(
        &self,
        attribute: &str,
        filter: Option<&Filter>,
    ) -> DimensionResult<Option<DimensionValue>> {
        Ok(aggregate(
            self.matching(filter).filter_map(|r| r.get(attribute).cloned()),
            false,
        ))
    }

    fn max_of(
        &self,
        attribute: &str,
        filter: Option<&Filter>,
    ) -> DimensionResult<Option<DimensionValue>> {
        Ok(aggregate(
            self.matching(filter).filter_map(|r| r.get(attribute).cloned()),
            true,
        ))
    }

    fn unique_values(
        &self,
        attribute: &str,
        filter: Option<&Filter>,
    ) -> DimensionResult<Vec<DimensionValue>> {
        let mut out: Vec<DimensionValue> = Vec::new();
        for r in self.matching(filter) {
            if let Some(v) = r.get(attribute) {
                if !out.contains(v) {
                    out.push(v.clone());
                }
            }
        }
        Ok(out)
    }

    fn fetch(
        &self,
        filter: &Filter,
        sort: Option<SortHint>,
    ) -> DimensionResult<Vec<DomainSample>> {
        let mut samples: Vec<DomainSample> = self
            .matching(Some(filter))
            .filter_map(|r| self.sample_of(r))
            .collect();
        sort_samples(&mut samples);
        if sort == Some(SortHint::Descending) {
            samples.reverse();
        }
        Ok(samples)
    }

    fn full_sorted_domain(&self) -> DimensionResult<Vec<DomainSample>> {
        let mut samples: Vec<DomainSample> = self
            .records
            .iter()
            .filter_map(|r| self.sample_of(r))
            .collect();
        sort_samples(&mut samples);
        Ok(samples)
    }
}

/// One granule descriptor in a structured catalog.
#[derive(Debug, Clone)]
pub struct Granule {
    /// Granule identity within the catalog.
    pub id: String,
    /// Typed dimension attributes of the granule.
    pub attributes: DomainRecord,
}

impl Granule {
    pub fn new(id: impl Into<String>, attributes: DomainRecord) -> Self {
        Self {
            id: id.into(),
            attributes,
        }
    }
}

/// Structured granule catalog: each mosaic granule carries typed
/// dimension columns. Supports full filter pushdown. Queries are
/// served through a record view of the granule attributes, built once
/// at construction.
#[derive(Debug, Clone)]
pub struct GranuleCatalog {
    granules: Vec<Granule>,
    records: VectorSource,
}

impl GranuleCatalog {
    /// Build a catalog for one dimension binding. Fails when a granule
    /// does not carry the dimension attribute.
    pub fn new(
        attribute: impl Into<String>,
        end_attribute: Option<String>,
        granules: Vec<Granule>,
    ) -> DimensionResult<Self> {
        let attribute = attribute.into();
        for g in &granules {
            if !g.attributes.contains_key(&attribute) {
                return Err(DimensionError::DomainUnavailable(format!(
                    "granule '{}' is missing dimension attribute '{}'",
                    g.id, attribute
                )));
            }
        }
        let records = VectorSource::new(
            attribute,
            end_attribute,
            granules.iter().map(|g| g.attributes.clone()).collect(),
        );
        Ok(Self { granules, records })
    }

    pub fn granules(&self) -> &[Granule] {
        &self.granules
    }
}

impl DimensionDomainAccessor for GranuleCatalog {
    fn min_of(
        &self,
        attribute: &str,
        filter: Option<&Filter>,
    ) -> DimensionResult<Option<DimensionValue>> {
        self.records.min_of(attribute, filter)
    }

    fn max_of(
        &self,
        attribute: &str,
        filter: Option<&Filter>,
    ) -> DimensionResult<Option<DimensionValue>> {
        self.records.max_of(attribute, filter)
    }

    fn unique_values(
        &self,
        attribute: &str,
        filter: Option<&Filter>,
    ) -> DimensionResult<Vec<DimensionValue>> {
        self.records.unique_values(attribute, filter)
    }

    fn fetch(
        &self,
        filter: &Filter,
        sort: Option<SortHint>,
    ) -> DimensionResult<Vec<DomainSample>> {
        self.records.fetch(filter, sort)
    }

    fn full_sorted_domain(&self) -> DimensionResult<Vec<DomainSample>> {
        self.records.full_sorted_domain()
    }
}

/// Flat grid reader metadata: only a summary domain is available, no
/// per-item filtering. Served through the scan fallback.
#[derive(Debug, Clone)]
pub struct GridMetadataReader {
    domain: Vec<DomainSample>,
}

impl GridMetadataReader {
    /// Wrap a reader's advertised domain; sorted ascending on entry.
    pub fn new(mut domain: Vec<DomainSample>) -> Self {
        sort_samples(&mut domain);
        Self { domain }
    }

    fn no_pushdown<T>(&self) -> DimensionResult<T> {
        Err(DimensionError::DomainUnavailable(
            "grid metadata reader does not support filtered domain queries".to_string(),
        ))
    }
}

impl DimensionDomainAccessor for GridMetadataReader {
    fn supports_filter_pushdown(&self) -> bool {
        false
    }

    fn min_of(
        &self,
        _attribute: &str,
        filter: Option<&Filter>,
    ) -> DimensionResult<Option<DimensionValue>> {
        if filter.is_some() {
            return self.no_pushdown();
        }
        Ok(self.domain.first().map(|s| s.start().clone()))
    }

    fn max_of(
        &self,
        _attribute: &str,
        filter: Option<&Filter>,
    ) -> DimensionResult<Option<DimensionValue>> {
        if filter.is_some() {
            return self.no_pushdown();
        }
        Ok(aggregate(self.domain.iter().map(|s| s.end().clone()), true))
    }

    fn unique_values(
        &self,
        _attribute: &str,
        filter: Option<&Filter>,
    ) -> DimensionResult<Vec<DimensionValue>> {
        if filter.is_some() {
            return self.no_pushdown();
        }
        let mut out = Vec::new();
        for s in &self.domain {
            let v = s.start();
            if !out.contains(v) {
                out.push(v.clone());
            }
        }
        Ok(out)
    }

    fn fetch(
        &self,
        _filter: &Filter,
        _sort: Option<SortHint>,
    ) -> DimensionResult<Vec<DomainSample>> {
        self.no_pushdown()
    }

    fn full_sorted_domain(&self) -> DimensionResult<Vec<DomainSample>> {
        Ok(self.domain.clone())
    }
}
