use crate::{
    dto::roster::{Award, Guest, Room, ScoredGuest},
    error::ServiceError,
    services::scoring,
    state::{SharedState, event::AwardId, event::GuestId},
};

fn position(index: usize) -> u32 {
    u32::try_from(index + 1).unwrap_or(u32::MAX)
}

/// Awards in catalog order.
pub async fn list_awards(state: &SharedState) -> Result<Vec<Award>, ServiceError> {
    let awards = state.roster().list_awards().await?;
    Ok(awards.into_iter().map(Into::into).collect())
}

/// Award with the given id.
pub async fn get_award(state: &SharedState, id: AwardId) -> Result<Award, ServiceError> {
    list_awards(state)
        .await?
        .into_iter()
        .find(|award| award.id == id)
        .ok_or_else(|| ServiceError::NotFound(format!("award {id} not found")))
}

/// Rooms in roster order.
pub async fn list_rooms(state: &SharedState) -> Result<Vec<Room>, ServiceError> {
    let rooms = state.roster().list_rooms().await?;
    Ok(rooms
        .into_iter()
        .enumerate()
        .map(|(index, room)| Room::from_entity(position(index), room))
        .collect())
}

/// Room whose code matches `code`, ignoring case.
pub async fn get_room(state: &SharedState, code: &str) -> Result<Room, ServiceError> {
    list_rooms(state)
        .await?
        .into_iter()
        .find(|room| room.code.eq_ignore_ascii_case(code))
        .ok_or_else(|| ServiceError::NotFound(format!("room `{code}` not found")))
}

/// Guests in roster order, optionally restricted to one room.
pub async fn list_guests(
    state: &SharedState,
    room: Option<&str>,
) -> Result<Vec<Guest>, ServiceError> {
    let guests = state.roster().list_guests().await?;
    Ok(guests
        .into_iter()
        .enumerate()
        .map(|(index, guest)| Guest::from_entity(position(index), guest))
        .filter(|guest| room.is_none_or(|code| guest.in_room(code)))
        .collect())
}

/// Guest at roster position `id`.
pub async fn get_guest(state: &SharedState, id: GuestId) -> Result<Guest, ServiceError> {
    list_guests(state, None)
        .await?
        .into_iter()
        .find(|guest| guest.id == id)
        .ok_or_else(|| ServiceError::NotFound(format!("guest {id} not found")))
}

/// Guests ranked against the winners currently in the store.
pub async fn scoreboard(
    state: &SharedState,
    room: Option<&str>,
) -> Result<Vec<ScoredGuest>, ServiceError> {
    let guests = list_guests(state, room).await?;
    let winners = state.store().get().await.winners;
    Ok(scoring::rank(guests, &winners))
}
