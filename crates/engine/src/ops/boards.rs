use sea_orm::{
    ActiveValue, DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
};

use crate::{
    CardMoveCmd, EngineError, ResultEngine, boards, cards, ordering,
    util::{normalize_optional_text, normalize_required_name},
};

use super::{Engine, with_tx};

/// A board with its cards, both in position order.
#[derive(Clone, Debug, PartialEq)]
pub struct BoardWithCards {
    pub board: boards::Model,
    pub cards: Vec<cards::Model>,
}

impl Engine {
    async fn boards_ordered(
        &self,
        db: &DatabaseTransaction,
        workspace_id: &str,
    ) -> ResultEngine<Vec<boards::Model>> {
        boards::Entity::find()
            .filter(boards::Column::WorkspaceId.eq(workspace_id.to_string()))
            .order_by_asc(boards::Column::Position)
            .all(db)
            .await
            .map_err(Into::into)
    }

    async fn cards_ordered(
        &self,
        db: &DatabaseTransaction,
        board_id: &str,
    ) -> ResultEngine<Vec<cards::Model>> {
        cards::Entity::find()
            .filter(cards::Column::BoardId.eq(board_id.to_string()))
            .order_by_asc(cards::Column::Position)
            .all(db)
            .await
            .map_err(Into::into)
    }

    /// Rewrites `position` for every board whose stored value disagrees with
    /// its index in the given order.
    async fn persist_board_positions(
        &self,
        db: &DatabaseTransaction,
        list: &[boards::Model],
    ) -> ResultEngine<()> {
        for (index, board) in ordering::stale_positions(list, |b| b.position) {
            let model = boards::ActiveModel {
                id: ActiveValue::Set(board.id.clone()),
                position: ActiveValue::Set(index as i32),
                ..Default::default()
            };
            model.update(db).await?;
        }
        Ok(())
    }

    /// Same as [`Self::persist_board_positions`] for cards within one board.
    async fn persist_card_positions(
        &self,
        db: &DatabaseTransaction,
        list: &[cards::Model],
    ) -> ResultEngine<()> {
        for (index, card) in ordering::stale_positions(list, |c| c.position) {
            let model = cards::ActiveModel {
                id: ActiveValue::Set(card.id.clone()),
                position: ActiveValue::Set(index as i32),
                ..Default::default()
            };
            model.update(db).await?;
        }
        Ok(())
    }

    /// Add a board at the end of the workspace's order.
    pub async fn new_board(
        &self,
        workspace_id: &str,
        name: &str,
        user_id: &str,
    ) -> ResultEngine<String> {
        let name = normalize_required_name(name, "board name")?;
        with_tx!(self, |db_tx| {
            self.require_workspace_write(&db_tx, workspace_id, user_id)
                .await?;
            let count = boards::Entity::find()
                .filter(boards::Column::WorkspaceId.eq(workspace_id.to_string()))
                .count(&db_tx)
                .await?;
            let model = boards::new_board(workspace_id, name.clone(), count as i32);
            let inserted = model.insert(&db_tx).await?;
            Ok(inserted.id)
        })
    }

    /// Return the workspace's boards with their cards, everything in
    /// position order.
    pub async fn boards(
        &self,
        workspace_id: &str,
        user_id: &str,
    ) -> ResultEngine<Vec<BoardWithCards>> {
        with_tx!(self, |db_tx| {
            self.require_workspace_read(&db_tx, workspace_id, user_id)
                .await?;
            let board_models = self.boards_ordered(&db_tx, workspace_id).await?;
            let mut result = Vec::with_capacity(board_models.len());
            for board in board_models {
                let cards = self.cards_ordered(&db_tx, &board.id).await?;
                result.push(BoardWithCards { board, cards });
            }
            Ok(result)
        })
    }

    /// Rename a board.
    pub async fn rename_board(
        &self,
        board_id: &str,
        name: &str,
        user_id: &str,
    ) -> ResultEngine<()> {
        let name = normalize_required_name(name, "board name")?;
        with_tx!(self, |db_tx| {
            let board = self.require_board(&db_tx, board_id).await?;
            self.require_workspace_write(&db_tx, &board.workspace_id, user_id)
                .await?;
            let mut active: boards::ActiveModel = board.into();
            active.name = ActiveValue::Set(name.clone());
            active.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Delete a board with its cards and close the position gap.
    pub async fn delete_board(&self, board_id: &str, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let board = self.require_board(&db_tx, board_id).await?;
            let workspace_id = board.workspace_id.clone();
            self.require_workspace_write(&db_tx, &workspace_id, user_id)
                .await?;

            cards::Entity::delete_many()
                .filter(cards::Column::BoardId.eq(board_id.to_string()))
                .exec(&db_tx)
                .await?;
            let active: boards::ActiveModel = board.into();
            active.delete(&db_tx).await?;

            let survivors = self.boards_ordered(&db_tx, &workspace_id).await?;
            self.persist_board_positions(&db_tx, &survivors).await?;
            Ok(())
        })
    }

    /// Move a board from `source` to `dest` in the workspace's order.
    ///
    /// The read-compute-write of the whole position list happens inside one
    /// transaction so concurrent readers never observe gaps or duplicates.
    pub async fn reorder_boards(
        &self,
        workspace_id: &str,
        source: usize,
        dest: usize,
        user_id: &str,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_workspace_write(&db_tx, workspace_id, user_id)
                .await?;
            let mut list = self.boards_ordered(&db_tx, workspace_id).await?;
            ordering::reorder(&mut list, source, dest)?;
            self.persist_board_positions(&db_tx, &list).await?;
            Ok(())
        })
    }

    /// Add a card at the end of the board's order.
    pub async fn new_card(
        &self,
        board_id: &str,
        title: &str,
        description: Option<&str>,
        user_id: &str,
    ) -> ResultEngine<String> {
        let title = normalize_required_name(title, "card title")?;
        let description = normalize_optional_text(description);
        with_tx!(self, |db_tx| {
            let board = self.require_board(&db_tx, board_id).await?;
            self.require_workspace_write(&db_tx, &board.workspace_id, user_id)
                .await?;
            let count = cards::Entity::find()
                .filter(cards::Column::BoardId.eq(board_id.to_string()))
                .count(&db_tx)
                .await?;
            let model = cards::new_card(board_id, title.clone(), description.clone(), count as i32);
            let inserted = model.insert(&db_tx).await?;
            Ok(inserted.id)
        })
    }

    /// Update a card's title and/or description.
    pub async fn update_card(
        &self,
        card_id: &str,
        title: Option<&str>,
        description: Option<&str>,
        user_id: &str,
    ) -> ResultEngine<()> {
        let title = title
            .map(|t| normalize_required_name(t, "card title"))
            .transpose()?;
        let description = normalize_optional_text(description);
        with_tx!(self, |db_tx| {
            let card = self.require_card(&db_tx, card_id).await?;
            let board = self.require_board(&db_tx, &card.board_id).await?;
            self.require_workspace_write(&db_tx, &board.workspace_id, user_id)
                .await?;

            let mut active: cards::ActiveModel = card.into();
            if let Some(title) = title.clone() {
                active.title = ActiveValue::Set(title);
            }
            if let Some(description) = description.clone() {
                active.description = ActiveValue::Set(Some(description));
            }
            active.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Delete a card and close the position gap in its board.
    pub async fn delete_card(&self, card_id: &str, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let card = self.require_card(&db_tx, card_id).await?;
            let board = self.require_board(&db_tx, &card.board_id).await?;
            self.require_workspace_write(&db_tx, &board.workspace_id, user_id)
                .await?;

            let board_id = card.board_id.clone();
            let active: cards::ActiveModel = card.into();
            active.delete(&db_tx).await?;

            let survivors = self.cards_ordered(&db_tx, &board_id).await?;
            self.persist_card_positions(&db_tx, &survivors).await?;
            Ok(())
        })
    }

    /// Move a card within one board or across two boards of the same
    /// workspace, renumbering every affected list in one transaction.
    pub async fn move_card(&self, cmd: CardMoveCmd) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_workspace_write(&db_tx, &cmd.workspace_id, &cmd.user_id)
                .await?;

            let source_board = self.require_board(&db_tx, &cmd.source_board_id).await?;
            if source_board.workspace_id != cmd.workspace_id {
                return Err(EngineError::KeyNotFound(format!(
                    "board '{}' is not part of this workspace",
                    cmd.source_board_id
                )));
            }

            if cmd.source_board_id == cmd.dest_board_id {
                let mut list = self.cards_ordered(&db_tx, &cmd.source_board_id).await?;
                ordering::reorder(&mut list, cmd.source_index, cmd.dest_index)?;
                self.persist_card_positions(&db_tx, &list).await?;
                return Ok(());
            }

            let dest_board = self.require_board(&db_tx, &cmd.dest_board_id).await?;
            if dest_board.workspace_id != cmd.workspace_id {
                return Err(EngineError::KeyNotFound(format!(
                    "board '{}' is not part of this workspace",
                    cmd.dest_board_id
                )));
            }

            let mut source_list = self.cards_ordered(&db_tx, &cmd.source_board_id).await?;
            let mut dest_list = self.cards_ordered(&db_tx, &cmd.dest_board_id).await?;
            let moved_id = ordering::move_across(
                &mut source_list,
                &mut dest_list,
                cmd.source_index,
                cmd.dest_index,
            )?
            .id
            .clone();

            // The moved card changes container, so it always gets a write;
            // its siblings only when their position shifted.
            for (index, card) in dest_list.iter().enumerate() {
                if card.id == moved_id {
                    let model = cards::ActiveModel {
                        id: ActiveValue::Set(card.id.clone()),
                        board_id: ActiveValue::Set(cmd.dest_board_id.clone()),
                        position: ActiveValue::Set(index as i32),
                        ..Default::default()
                    };
                    model.update(&db_tx).await?;
                } else if card.position != index as i32 {
                    let model = cards::ActiveModel {
                        id: ActiveValue::Set(card.id.clone()),
                        position: ActiveValue::Set(index as i32),
                        ..Default::default()
                    };
                    model.update(&db_tx).await?;
                }
            }
            self.persist_card_positions(&db_tx, &source_list).await?;

            Ok(())
        })
    }
}
