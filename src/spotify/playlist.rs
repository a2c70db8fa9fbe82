use crate::{
    Res,
    error::Error,
    spotify::Catalog,
    types::{PublishedPlaylist, TrackRef},
    warning,
};

/// Creates a public playlist owned by the current user and fills it.
///
/// Steps run in order and each failure stops the rest:
/// 1. resolve the current user id
/// 2. create the public playlist named `title`
/// 3. add all tracks in one request
///
/// # Errors
///
/// If step 3 fails the playlist already exists. The publisher then tries once
/// to remove it again and returns [`Error::PartialPublish`] carrying the
/// playlist id, the title and whether the removal worked.
pub async fn publish(
    catalog: &dyn Catalog,
    token: &str,
    title: &str,
    tracks: &[TrackRef],
) -> Res<PublishedPlaylist> {
    if tracks.is_empty() {
        return Err(Error::InvalidInput(
            "a playlist needs at least one track".to_string(),
        ));
    }

    let user_id = catalog.current_user_id(token).await?;
    let created = catalog.create_playlist(token, &user_id, title).await?;

    let uris: Vec<String> = tracks.iter().map(|t| t.uri.clone()).collect();
    if let Err(e) = catalog.add_tracks(token, &created.id, &uris).await {
        let cleaned_up = match catalog.remove_playlist(token, &created.id).await {
            Ok(()) => true,
            Err(cleanup) => {
                warning!(
                    "Failed to remove empty playlist {} after track add failed: {}",
                    created.id,
                    cleanup
                );
                false
            }
        };

        return Err(Error::PartialPublish {
            playlist_id: created.id,
            title: title.to_string(),
            cleaned_up,
            source: Box::new(e),
        });
    }

    Ok(PublishedPlaylist {
        id: created.id,
        title: title.to_string(),
        url: created.external_urls.spotify,
        track_count: uris.len(),
    })
}
