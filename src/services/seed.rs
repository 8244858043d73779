// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Demo content: what a fresh backend starts with, what "restore defaults"
//! puts back, and what a first local-only start is seeded with.

use chrono::Utc;

use crate::models::{Category, DataSnapshot, NewOffer, NewProfile, Offer, Profile};

/// Build the demo collections, drawing ids from `next_id`.
pub fn demo_snapshot(mut next_id: impl FnMut() -> String) -> DataSnapshot {
    let now = Utc::now();

    let discounts: Vec<Offer> = demo_offers()
        .into_iter()
        .map(|offer| offer.into_offer(next_id(), now))
        .collect();
    let profiles: Vec<Profile> = demo_profiles()
        .into_iter()
        .map(|profile| profile.into_profile(next_id(), now))
        .collect();

    DataSnapshot {
        discounts,
        profiles,
    }
}

fn demo_offers() -> Vec<NewOffer> {
    vec![
        NewOffer {
            title: "Кофейня \"Кофе Хаус\"".to_string(),
            description: "Скидка 15% на все напитки при предъявлении студенческого билета. \
                          Действует с понедельника по пятницу с 9:00 до 18:00."
                .to_string(),
            coordinates: Some("60.711503, 28.748026".to_string()),
            category: Category::Food,
            is_active: true,
        },
        NewOffer {
            title: "Кинотеатр \"Синема Парк\"".to_string(),
            description: "2 билета по цене одного на вечерние сеансы с понедельника по четверг."
                .to_string(),
            coordinates: Some("60.712345, 28.749876".to_string()),
            category: Category::Entertainment,
            is_active: true,
        },
    ]
}

fn demo_profiles() -> Vec<NewProfile> {
    vec![
        NewProfile {
            name: "Иванов Алексей Петрович".to_string(),
            telegram: Some("alex_ivanov".to_string()),
            phone: Some("+7 (912) 345-67-89".to_string()),
            photo: None,
            position: Some("Председатель совета молодежи".to_string()),
            is_active: true,
        },
        NewProfile {
            name: "Петрова Мария Сергеевна".to_string(),
            telegram: Some("maria_petrova".to_string()),
            phone: Some("+7 (923) 456-78-90".to_string()),
            photo: None,
            position: Some("Заместитель председателя".to_string()),
            is_active: true,
        },
    ]
}
