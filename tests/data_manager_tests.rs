// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data manager tests against the real router on a localhost port.
//!
//! An outage is simulated by shutting the server down; from then on every
//! request fails to connect, which is exactly what a dropped network looks
//! like to the client.

use youth_council::error::{DataError, RemoteError};
use youth_council::models::{
    Category, Credentials, NewOffer, NewProfile, Offer, OfferPatch, ProfilePatch,
};
use youth_council::services::{DataManager, LocalStore, Mode};

mod common;

/// Facade over a live backend, not logged in.
async fn anonymous_manager() -> (common::TestServer, DataManager) {
    let server = common::TestServer::start().await;
    let manager = common::data_manager(&server.api_url(), LocalStore::in_memory());
    (server, manager)
}

/// Facade over a live backend with an admin session.
async fn online_manager() -> (common::TestServer, DataManager) {
    let (server, manager) = anonymous_manager().await;
    let login = manager
        .login(&Credentials::new("admin", "test_password"))
        .await
        .unwrap();
    assert!(login.success);
    (server, manager)
}

fn coffee() -> NewOffer {
    NewOffer {
        title: "Coffee 15%".to_string(),
        category: Category::Food,
        is_active: true,
        ..NewOffer::new("", Category::Food)
    }
}

#[tokio::test]
async fn test_add_then_get_returns_the_same_offer() {
    let (_server, manager) = online_manager().await;

    let created = manager.add_offer(coffee()).await.unwrap();
    assert!(!created.id.is_empty());
    assert_eq!(created.title, "Coffee 15%");
    assert_eq!(created.category, Category::Food);
    assert!(created.is_active);

    let fetched = manager.get_offer(&created.id).await.unwrap();
    assert_eq!(fetched, Some(created));
    assert_eq!(manager.status().mode, Mode::Remote);
}

#[tokio::test]
async fn test_delete_then_get_is_none() {
    let (_server, manager) = online_manager().await;

    let created = manager.add_profile(NewProfile::new("Oleg")).await.unwrap();
    manager.delete_profile(&created.id).await.unwrap();

    assert_eq!(manager.get_profile(&created.id).await.unwrap(), None);
    let listed = manager.list_profiles().await.unwrap();
    assert!(listed.iter().all(|p| p.id != created.id));
    // Mirror dropped it too
    assert!(manager.store().profiles().iter().all(|p| p.id != created.id));
}

#[tokio::test]
async fn test_update_is_idempotent() {
    let (_server, manager) = online_manager().await;
    let created = manager.add_offer(coffee()).await.unwrap();

    let patch = OfferPatch {
        description: Some("Weekdays 9-18".to_string()),
        is_active: Some(false),
        ..OfferPatch::default()
    };
    let first = manager.update_offer(&created.id, patch.clone()).await.unwrap();
    let second = manager.update_offer(&created.id, patch).await.unwrap();

    assert_eq!(
        Offer {
            updated_at: second.updated_at,
            ..first.clone()
        },
        second
    );
    assert!(second.updated_at >= first.updated_at);
}

#[tokio::test]
async fn test_list_active_is_the_active_subset() {
    let (_server, manager) = online_manager().await;
    let hidden = manager
        .add_offer(NewOffer {
            is_active: false,
            ..coffee()
        })
        .await
        .unwrap();

    let all = manager.list_offers().await.unwrap();
    let active = manager.list_active_offers().await.unwrap();

    let expected: Vec<Offer> = all.into_iter().filter(|o| o.is_active).collect();
    assert_eq!(active, expected);
    assert!(active.iter().all(|o| o.id != hidden.id));
}

#[tokio::test]
async fn test_toggle_flips_active_without_deleting() {
    let (_server, manager) = online_manager().await;
    let created = manager.add_offer(coffee()).await.unwrap();

    let toggled = manager.toggle_offer_active(&created.id).await.unwrap();
    assert!(!toggled.is_active);
    let toggled = manager.toggle_offer_active(&created.id).await.unwrap();
    assert!(toggled.is_active);

    assert!(manager.get_offer(&created.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_application_error_is_not_swallowed() {
    let (_server, manager) = online_manager().await;

    let err = manager
        .update_offer("no-such-offer", OfferPatch::active(false))
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert!(matches!(
        err,
        DataError::Remote(RemoteError::Application { status: 404, .. })
    ));
    // Not mistaken for an outage, and nothing written locally
    assert_eq!(manager.status().mode, Mode::Remote);
    assert!(manager.store().offers().iter().all(|o| o.id != "no-such-offer"));
}

#[tokio::test]
async fn test_remote_validation_error_propagates() {
    let (_server, manager) = online_manager().await;
    let offers = manager.list_offers().await.unwrap();

    let err = manager
        .update_offer(
            &offers[0].id,
            OfferPatch {
                title: Some(String::new()),
                ..OfferPatch::default()
            },
        )
        .await
        .unwrap_err();

    assert_eq!(
        match err {
            DataError::Remote(e) => e.status(),
            _ => None,
        },
        Some(400)
    );
}

#[tokio::test]
async fn test_offline_reads_serve_the_write_through_cache() {
    let (mut server, manager) = online_manager().await;

    let offers = manager.list_offers().await.unwrap();
    let profiles = manager.list_profiles().await.unwrap();
    assert_eq!(offers.len(), 2);

    server.stop().await;

    assert_eq!(manager.list_offers().await.unwrap(), offers);
    assert_eq!(manager.list_profiles().await.unwrap(), profiles);
    assert_eq!(
        manager.get_offer(&offers[0].id).await.unwrap().as_ref(),
        Some(&offers[0])
    );

    let stats = manager.get_stats().await.unwrap();
    assert_eq!(stats.total_discounts, 2);
    assert_eq!(stats.total_profiles, 2);

    let status = manager.status();
    assert!(status.remote_enabled);
    assert!(!status.remote_reachable);
    assert_eq!(status.mode, Mode::RemoteOffline);
}

#[tokio::test]
async fn test_remote_deactivation_keeps_cached_record() {
    let (mut server, manager) = online_manager().await;

    let offers = manager.list_offers().await.unwrap();
    let target = offers[0].id.clone();
    server
        .state
        .db
        .update::<Offer>(&target, OfferPatch::active(false))
        .await
        .unwrap();

    let active = manager.list_active_offers().await.unwrap();
    assert!(active.iter().all(|o| o.id != target));

    server.stop().await;

    let cached = manager.list_offers().await.unwrap();
    assert_eq!(cached.len(), offers.len());
    let deactivated = cached.iter().find(|o| o.id == target).unwrap();
    assert!(!deactivated.is_active);

    let toggled = manager.toggle_offer_active(&target).await.unwrap();
    assert!(toggled.is_active);
}

#[tokio::test]
async fn test_offer_survives_an_outage() {
    let (mut server, manager) = online_manager().await;

    // Online: create and see it in the active list
    let created = manager.add_offer(coffee()).await.unwrap();
    let active = manager.list_active_offers().await.unwrap();
    assert!(active.iter().any(|o| o.id == created.id));

    server.stop().await;

    // Offline: the cached active list still has it
    let active = manager.list_active_offers().await.unwrap();
    let cached = active
        .iter()
        .find(|o| o.id == created.id)
        .expect("offer served from cache");
    assert_eq!(cached.title, "Coffee 15%");

    // Offline update lands locally without an error
    let updated = manager
        .update_offer(&created.id, OfferPatch::active(false))
        .await
        .unwrap();
    assert!(!updated.is_active);
    assert!(updated.updated_at >= created.updated_at);

    let local = manager.store().offers();
    let local_copy = local.iter().find(|o| o.id == created.id).unwrap();
    assert!(!local_copy.is_active);
    assert!(manager
        .list_active_offers()
        .await
        .unwrap()
        .iter()
        .all(|o| o.id != created.id));
}

#[tokio::test]
async fn test_offline_add_synthesizes_id_and_timestamps() {
    let (mut server, manager) = online_manager().await;
    manager.list_profiles().await.unwrap();
    server.stop().await;

    let created = manager
        .add_profile(NewProfile {
            telegram: Some("@new_member".to_string()),
            ..NewProfile::new("Ivan")
        })
        .await
        .unwrap();

    assert!(!created.id.is_empty());
    assert_eq!(created.created_at, created.updated_at);
    assert_eq!(manager.list_profiles().await.unwrap().len(), 3);

    // Not replayed: the backend never saw it
    let remote: Vec<youth_council::models::Profile> = server.state.db.list().await;
    assert!(remote.iter().all(|p| p.id != created.id));
}

#[tokio::test]
async fn test_offline_update_of_uncached_id_is_not_found() {
    let (mut server, manager) = online_manager().await;
    server.stop().await;

    let err = manager
        .update_profile("never-seen", ProfilePatch::active(false))
        .await
        .unwrap_err();
    assert!(matches!(err, DataError::NotFound { .. }));
}

#[tokio::test]
async fn test_find_profile_by_telegram() {
    let (_server, manager) = online_manager().await;

    let found = manager
        .find_profile_by_telegram("alex_ivanov")
        .await
        .unwrap()
        .expect("seeded profile");
    assert_eq!(found.telegram.as_deref(), Some("alex_ivanov"));

    assert!(manager
        .find_profile_by_telegram("nope")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_login_check_auth_logout() {
    let (_server, manager) = anonymous_manager().await;

    let rejected = manager
        .login(&Credentials::new("admin", "wrong"))
        .await
        .unwrap();
    assert!(!rejected.success);
    assert!(!manager.check_auth().await.unwrap());

    let accepted = manager
        .login(&Credentials::new("admin", "test_password"))
        .await
        .unwrap();
    assert!(accepted.success);
    assert!(manager.store().admin_token().is_some());
    assert!(manager.check_auth().await.unwrap());

    // The session token authorizes admin writes
    manager.add_offer(coffee()).await.unwrap();

    manager.logout().unwrap();
    assert!(!manager.check_auth().await.unwrap());
    assert!(manager.store().admin_token().is_none());
}

#[tokio::test]
async fn test_admin_write_without_login_is_unauthorized() {
    let (_server, manager) = anonymous_manager().await;

    let err = manager.add_offer(coffee()).await.unwrap_err();
    assert!(matches!(
        err,
        DataError::Remote(RemoteError::Application { status: 401, .. })
    ));
}

#[tokio::test]
async fn test_offline_login_uses_configured_credentials() {
    let manager = common::data_manager(&common::dead_url().await, LocalStore::in_memory());

    let accepted = manager
        .login(&Credentials::new("admin", "test_password"))
        .await
        .unwrap();
    assert!(accepted.success);
    assert!(accepted.token.is_none());
    assert!(manager.check_auth().await.unwrap());
}

#[tokio::test]
async fn test_export_import_clear_restore() {
    let (_server, manager) = online_manager().await;

    let bundle = manager.export_all().await.unwrap();
    assert_eq!(bundle.discounts.len(), 2);

    manager.clear_all().await.unwrap();
    assert!(manager.list_offers().await.unwrap().is_empty());
    assert!(manager.store().offers().is_empty());

    let imported = manager.import_all(&bundle).await.unwrap();
    assert_eq!(imported.discounts, bundle.discounts);
    assert_eq!(manager.store().offers(), bundle.discounts);

    let restored = manager.restore_defaults().await.unwrap();
    assert_eq!(restored.profiles.len(), 2);
    assert_eq!(manager.store().profiles(), restored.profiles);
}

#[tokio::test]
async fn test_initialize_demotes_when_api_is_down() {
    let manager = common::data_manager(&common::dead_url().await, LocalStore::in_memory());

    let status = manager.initialize().await.unwrap();
    assert_eq!(status.mode, Mode::Local);
    assert!(!manager.remote_enabled());

    // Local mode starts with demo data and a settings record
    assert_eq!(manager.list_offers().await.unwrap().len(), 2);
    let settings = manager.store().settings().expect("settings written");
    assert!(settings.use_local_mode);
    assert!(settings.demo_data_initialized);
}

#[tokio::test]
async fn test_initialize_keeps_remote_when_healthy() {
    let (_server, manager) = anonymous_manager().await;

    let status = manager.initialize().await.unwrap();
    assert_eq!(status.mode, Mode::Remote);
    assert!(manager.check_server_status().await);
    assert!(manager.store().offers().is_empty());
}

#[tokio::test]
async fn test_remote_recovers_after_outage() {
    let (mut server, manager) = anonymous_manager().await;
    server.stop().await;

    manager.list_offers().await.unwrap();
    assert_eq!(manager.status().mode, Mode::RemoteOffline);

    // The manager retries the API on every call, no reconfiguration needed
    let _revived = common::TestServer::start_on(server.addr, server.state.clone()).await;
    let offers = manager.list_offers().await.unwrap();
    assert_eq!(offers.len(), 2);
    assert_eq!(manager.status().mode, Mode::Remote);
}
