//! Referential-integrity properties of the entity cache under event
//! sequences

use integration_tests::fixtures;
use trivia_cache::EntityCache;
use trivia_core::Snowflake;

/// The cache-wide invariants that must hold after every applied event:
/// live channels and members resolve to live guilds, member role references
/// resolve, and a user is present exactly while it has memberships.
fn assert_invariants(cache: &EntityCache) {
    for channel in cache.iter_channels() {
        assert!(
            cache.guild(channel.guild_id).is_some(),
            "channel {} points at dead guild {}",
            channel.id,
            channel.guild_id
        );
    }

    for member in cache.iter_members() {
        assert!(
            cache.guild(member.guild_id).is_some(),
            "member of dead guild {}",
            member.guild_id
        );
        for role_id in &member.role_ids {
            assert!(
                cache.role(*role_id).is_some(),
                "member references dead role {role_id}"
            );
        }
        let user = cache
            .user(member.user_id)
            .expect("member without a backing user");
        assert!(user.guild_ids.contains(&member.guild_id));
    }

    for user in cache.iter_users() {
        assert!(
            !user.guild_ids.is_empty(),
            "user {} cached with empty membership set",
            user.id
        );
        for guild_id in &user.guild_ids {
            assert!(
                cache.member(*guild_id, user.id).is_some(),
                "user {} claims membership in {guild_id} without a member record",
                user.id
            );
        }
    }
}

#[test]
fn channels_always_resolve_to_live_guilds() {
    let mut cache = EntityCache::new();

    cache.apply_guild_create(&fixtures::guild(1, &[1, 2]));
    assert_invariants(&cache);

    cache.apply_guild_create(&fixtures::guild(2, &[2, 3]));
    assert_invariants(&cache);

    cache.apply_channel_create(&fixtures::channel(11, 1, "extra"));
    cache.apply_channel_create(&fixtures::channel(21, 2, "extra"));
    assert_invariants(&cache);

    cache.apply_guild_delete(&fixtures::guild_delete(1));
    assert_invariants(&cache);
    assert!(cache.channel(Snowflake::new(10)).is_none());
    assert!(cache.channel(Snowflake::new(11)).is_none());
    assert!(cache.channel(Snowflake::new(21)).is_some());

    cache.apply_channel_delete(&fixtures::channel(21, 2, "extra"));
    assert_invariants(&cache);

    cache.apply_guild_delete(&fixtures::guild_delete(2));
    assert_invariants(&cache);
    assert_eq!(cache.channel_count(), 0);
    assert_eq!(cache.guild_count(), 0);
}

#[test]
fn channel_events_for_dead_guilds_are_skipped() {
    let mut cache = EntityCache::new();

    cache.apply_guild_create(&fixtures::guild(1, &[1]));
    cache.apply_guild_delete(&fixtures::guild_delete(1));

    // late channel create for the deleted guild must not resurrect anything
    cache.apply_channel_create(&fixtures::channel(11, 1, "ghost"));
    assert_invariants(&cache);
    assert_eq!(cache.channel_count(), 0);

    // and a repeated delete is harmless
    cache.apply_guild_delete(&fixtures::guild_delete(1));
    assert_invariants(&cache);
}

#[test]
fn users_exist_exactly_while_membered() {
    let mut cache = EntityCache::new();
    let user = Snowflake::new(7);

    cache.apply_guild_create(&fixtures::guild(1, &[1]));
    cache.apply_guild_create(&fixtures::guild(2, &[1]));
    assert!(cache.user(user).is_none());

    cache.apply_member_add(&fixtures::member_add(1, 7));
    assert_invariants(&cache);
    assert!(cache.user(user).is_some());

    cache.apply_member_add(&fixtures::member_add(2, 7));
    assert_invariants(&cache);
    assert_eq!(cache.user(user).unwrap().guild_ids.len(), 2);

    cache.apply_member_remove(&fixtures::member_remove(1, 7));
    assert_invariants(&cache);
    assert!(cache.user(user).is_some(), "still membered in guild 2");

    cache.apply_member_remove(&fixtures::member_remove(2, 7));
    assert_invariants(&cache);
    assert!(cache.user(user).is_none(), "last membership removed");

    // duplicate remove is a no-op
    cache.apply_member_remove(&fixtures::member_remove(2, 7));
    assert_invariants(&cache);
}

#[test]
fn interleaved_add_remove_sequences_hold_the_user_property() {
    let mut cache = EntityCache::new();
    cache.apply_guild_create(&fixtures::guild(1, &[]));
    cache.apply_guild_create(&fixtures::guild(2, &[]));
    cache.apply_guild_create(&fixtures::guild(3, &[]));

    // (guild, user, add?) - a scripted shuffle of joins and leaves
    let script: &[(u64, u64, bool)] = &[
        (1, 10, true),
        (2, 10, true),
        (1, 11, true),
        (1, 10, false),
        (3, 11, true),
        (2, 10, false),
        (1, 11, false),
        (3, 11, false),
        (3, 12, true),
        (1, 12, true),
    ];

    for &(guild_id, user_id, add) in script {
        if add {
            cache.apply_member_add(&fixtures::member_add(guild_id, user_id));
        } else {
            cache.apply_member_remove(&fixtures::member_remove(guild_id, user_id));
        }
        assert_invariants(&cache);
    }

    assert!(cache.user(Snowflake::new(10)).is_none());
    assert!(cache.user(Snowflake::new(11)).is_none());
    assert_eq!(cache.user(Snowflake::new(12)).unwrap().guild_ids.len(), 2);
}

#[test]
fn guild_delete_and_recreate_round_trip() {
    let mut cache = EntityCache::new();

    cache.apply_guild_create(&fixtures::guild(1, &[1, 2, 3]));
    cache.apply_guild_delete(&fixtures::guild_delete(1));
    assert_eq!(cache.user_count(), 0);

    cache.apply_guild_create(&fixtures::guild(1, &[2, 3]));
    assert_invariants(&cache);
    assert_eq!(cache.user_count(), 2);
    assert_eq!(cache.guild(Snowflake::new(1)).unwrap().member_ids.len(), 2);
}
