use crate::dtos::searchdtos::SearchFilterDto;
use crate::models::propertymodel::{MetadataKind, PriceKind};
use crate::models::taxonomymodel::LocationCategory;
use crate::service::error::ServiceError;

/// Radius applied to geolocation criteria, in statute miles.
pub const RADIUS_MILES: f64 = 100.0;

/// One normalized query constraint. The compiler emits exactly one predicate
/// per supplied criterion; predicates are AND-combined by the store layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    AdType(String),
    AdSubtype(String),
    PropertyTypeIn(Vec<String>),
    PropertySubtype(String),
    AnnouncementCode(String),
    /// Metadata list contains an entry of `kind` with amount >= `amount`.
    MetadataAtLeast { kind: MetadataKind, amount: i32 },
    /// Prices list contains an entry of `kind` with value >= `value`.
    PriceAtLeast { kind: PriceKind, value: i64 },
    /// Prices list contains an entry of `kind` with value <= `value`.
    PriceAtMost { kind: PriceKind, value: i64 },
    /// Spherical proximity bound of RADIUS_MILES around the point.
    WithinRadius { latitude: f64, longitude: f64 },
    /// Property carries at least one of the given tags.
    TagsAny(Vec<String>),
    /// OR-of-equality on the address column selected by `category`.
    LocationIn {
        category: LocationCategory,
        names: Vec<String>,
    },
    MinSizeAtLeast(f64),
    Highlighted(bool),
    IsActive(bool),
}

fn parse_bound(raw: &str, field: &str) -> Result<i64, ServiceError> {
    raw.trim().parse::<i64>().map_err(|_| {
        ServiceError::Validation(format!("{} must be a whole number, got \"{}\"", field, raw))
    })
}

/// Translates an ordered list of filter objects into the organic predicate
/// list. Two sentinels always close the list: `highlighted = false` and
/// `is_active = true`, so the base query never surfaces sponsored or
/// de-listed rows.
pub fn compile_filters(filters: &[SearchFilterDto]) -> Result<Vec<Predicate>, ServiceError> {
    let mut predicates = Vec::new();

    for filter in filters {
        if let Some(value) = &filter.ad_type {
            predicates.push(Predicate::AdType(value.clone()));
        }
        if let Some(value) = &filter.ad_subtype {
            predicates.push(Predicate::AdSubtype(value.clone()));
        }
        if let Some(types) = &filter.property_type {
            predicates.push(Predicate::PropertyTypeIn(types.clone()));
        }
        if let Some(value) = &filter.property_subtype {
            predicates.push(Predicate::PropertySubtype(value.clone()));
        }
        if let Some(code) = &filter.announcement_code {
            predicates.push(Predicate::AnnouncementCode(code.clone()));
        }

        let thresholds = [
            (filter.bedrooms, MetadataKind::Bedroom),
            (filter.bathrooms, MetadataKind::Bathroom),
            (filter.parking_spaces, MetadataKind::Garage),
            (filter.floors, MetadataKind::Dependencies),
            (filter.suites, MetadataKind::Suites),
        ];
        for (amount, kind) in thresholds {
            if let Some(amount) = amount {
                predicates.push(Predicate::MetadataAtLeast { kind, amount });
            }
        }

        if let Some(raw) = &filter.min_price {
            predicates.push(Predicate::PriceAtLeast {
                kind: PriceKind::Mensal,
                value: parse_bound(raw, "minPrice")?,
            });
        }
        if let Some(raw) = &filter.max_price {
            predicates.push(Predicate::PriceAtMost {
                kind: PriceKind::Mensal,
                value: parse_bound(raw, "maxPrice")?,
            });
        }
        if let Some(raw) = &filter.min_condominium {
            predicates.push(Predicate::PriceAtLeast {
                kind: PriceKind::Condominio,
                value: parse_bound(raw, "minCondominium")?,
            });
        }
        if let Some(raw) = &filter.max_condominium {
            predicates.push(Predicate::PriceAtMost {
                kind: PriceKind::Condominio,
                value: parse_bound(raw, "maxCondominium")?,
            });
        }

        if let Some(point) = &filter.geolocation {
            predicates.push(Predicate::WithinRadius {
                latitude: point.lat,
                longitude: point.lon,
            });
        }

        if let Some(tags) = &filter.tags {
            predicates.push(Predicate::TagsAny(tags.clone()));
        }

        if let Some(entries) = &filter.location_filter {
            // Entries group by category, preserving first-seen order.
            let mut grouped: Vec<(LocationCategory, Vec<String>)> = Vec::new();
            for entry in entries {
                match grouped.iter_mut().find(|(c, _)| *c == entry.category) {
                    Some((_, names)) => names.push(entry.name.clone()),
                    None => grouped.push((entry.category, vec![entry.name.clone()])),
                }
            }
            for (category, names) in grouped {
                predicates.push(Predicate::LocationIn { category, names });
            }
        }

        if let Some(size) = filter.min_size {
            predicates.push(Predicate::MinSizeAtLeast(size));
        }
    }

    predicates.push(Predicate::Highlighted(false));
    predicates.push(Predicate::IsActive(true));
    Ok(predicates)
}

/// Derives the sponsored-slot predicate list from a compiled organic list:
/// the `highlighted` sentinel is flipped to true and proximity bounds are
/// dropped, since sponsored listings bypass geo scoping.
pub fn highlight_predicates(base: &[Predicate]) -> Vec<Predicate> {
    base.iter()
        .filter(|p| !matches!(p, Predicate::WithinRadius { .. }))
        .map(|p| match p {
            Predicate::Highlighted(false) => Predicate::Highlighted(true),
            other => other.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtos::searchdtos::{GeoPointDto, LocationFilterDto};

    fn filter() -> SearchFilterDto {
        SearchFilterDto::default()
    }

    #[test]
    fn empty_input_yields_only_sentinels() {
        let predicates = compile_filters(&[]).unwrap();
        assert_eq!(
            predicates,
            vec![Predicate::Highlighted(false), Predicate::IsActive(true)]
        );
    }

    #[test]
    fn every_criterion_becomes_one_predicate_in_order() {
        let mut first = filter();
        first.ad_type = Some("aluguel".to_string());
        first.bedrooms = Some(2);

        let mut second = filter();
        second.min_price = Some("150000".to_string());
        second.tags = Some(vec!["pets".to_string()]);

        let predicates = compile_filters(&[first, second]).unwrap();
        assert_eq!(
            predicates,
            vec![
                Predicate::AdType("aluguel".to_string()),
                Predicate::MetadataAtLeast {
                    kind: MetadataKind::Bedroom,
                    amount: 2
                },
                Predicate::PriceAtLeast {
                    kind: PriceKind::Mensal,
                    value: 150000
                },
                Predicate::TagsAny(vec!["pets".to_string()]),
                Predicate::Highlighted(false),
                Predicate::IsActive(true),
            ]
        );
    }

    #[test]
    fn condominium_bounds_target_the_condominio_price_kind() {
        let mut f = filter();
        f.min_condominium = Some("500".to_string());
        f.max_condominium = Some("900".to_string());

        let predicates = compile_filters(&[f]).unwrap();
        assert!(predicates.contains(&Predicate::PriceAtLeast {
            kind: PriceKind::Condominio,
            value: 500
        }));
        assert!(predicates.contains(&Predicate::PriceAtMost {
            kind: PriceKind::Condominio,
            value: 900
        }));
    }

    #[test]
    fn non_numeric_price_bound_is_rejected() {
        let mut f = filter();
        f.max_price = Some("cheap".to_string());

        let err = compile_filters(&[f]).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn location_entries_group_by_category() {
        let mut f = filter();
        f.location_filter = Some(vec![
            LocationFilterDto {
                name: "Curitiba".to_string(),
                category: LocationCategory::City,
            },
            LocationFilterDto {
                name: "PR".to_string(),
                category: LocationCategory::Uf,
            },
            LocationFilterDto {
                name: "Londrina".to_string(),
                category: LocationCategory::City,
            },
        ]);

        let predicates = compile_filters(&[f]).unwrap();
        assert_eq!(
            predicates[0],
            Predicate::LocationIn {
                category: LocationCategory::City,
                names: vec!["Curitiba".to_string(), "Londrina".to_string()],
            }
        );
        assert_eq!(
            predicates[1],
            Predicate::LocationIn {
                category: LocationCategory::Uf,
                names: vec!["PR".to_string()],
            }
        );
    }

    #[test]
    fn highlight_derivation_flips_sentinel_and_drops_radius() {
        let mut f = filter();
        f.geolocation = Some(GeoPointDto {
            lat: -25.42,
            lon: -49.27,
        });
        f.bathrooms = Some(1);

        let base = compile_filters(&[f]).unwrap();
        let highlighted = highlight_predicates(&base);

        assert!(highlighted
            .iter()
            .all(|p| !matches!(p, Predicate::WithinRadius { .. })));
        assert!(highlighted.contains(&Predicate::Highlighted(true)));
        assert!(!highlighted.contains(&Predicate::Highlighted(false)));
        // The non-geo criterion and the active sentinel survive untouched.
        assert!(highlighted.contains(&Predicate::MetadataAtLeast {
            kind: MetadataKind::Bathroom,
            amount: 1
        }));
        assert!(highlighted.contains(&Predicate::IsActive(true)));
    }
}
